use crate::config::SandboxConfig;
use crate::error::AgentError;
use tokio::process::Command;
use tracing::debug;

pub const OPEN_TAG: &str = "<execute_python>";
pub const CLOSE_TAG: &str = "</execute_python>";

/// Extracts the code between the first opening delimiter and the first
/// closing delimiter after it. Later delimiter pairs are ignored; at most
/// one block is ever extracted.
pub fn extract_code(text: &str) -> Option<&str> {
    let start = text.find(OPEN_TAG)? + OPEN_TAG.len();
    let end = text[start..].find(CLOSE_TAG)?;
    Some(&text[start..start + end])
}

/// Detection gate for a finished run: the code to execute, if any.
/// Nothing triggers unless execution is enabled, the final text is
/// present, and both delimiters occur in it.
pub fn runnable_code(execute_code: bool, text: Option<&str>) -> Option<&str> {
    if !execute_code {
        return None;
    }
    extract_code(text?)
}

/// Runs model-generated code as a standalone script in a throwaway
/// container: no network, capped memory and CPU, removed on exit.
pub struct CodeRunner {
    config: SandboxConfig,
}

impl CodeRunner {
    pub fn new(config: SandboxConfig) -> Self {
        Self { config }
    }

    /// Returns the decoded stdout followed by the decoded stderr as one
    /// blob. The script's own exit status is not inspected: a failing
    /// script surfaces as captured stderr text, not as an error.
    pub async fn run(&self, code: &str) -> Result<String, AgentError> {
        let args = self.build_args(code);
        debug!(image = %self.config.image, "running sandboxed code");

        let output = Command::new("docker")
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                AgentError::Sandbox(format!("failed to invoke container runtime: {}", e))
            })?;

        // 125/126/127 are the docker CLI's own failure codes (daemon
        // unreachable, image or entrypoint not runnable); anything else is
        // the script's status.
        if matches!(output.status.code(), Some(125) | Some(126) | Some(127)) {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AgentError::Sandbox(format!(
                "container run failed ({}): {}",
                output.status,
                stderr.trim()
            )));
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(combined)
    }

    fn build_args(&self, code: &str) -> Vec<String> {
        vec![
            "run".to_string(),
            "--rm".to_string(),
            "--network".to_string(),
            "none".to_string(),
            "--memory".to_string(),
            self.config.memory_limit.clone(),
            format!("--cpus={}", self.config.cpus),
            self.config.image.clone(),
            "python".to_string(),
            "-c".to_string(),
            code.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_block_only() {
        let text = "pre <execute_python>print(1)</execute_python> post \
                    <execute_python>ignored</execute_python>";
        assert_eq!(extract_code(text), Some("print(1)"));
    }

    #[test]
    fn no_delimiters_no_code() {
        assert_eq!(extract_code("plain answer"), None);
        assert_eq!(extract_code("<execute_python>unterminated"), None);
        assert_eq!(extract_code("stray close</execute_python>"), None);
    }

    #[test]
    fn empty_block() {
        assert_eq!(extract_code("<execute_python></execute_python>"), Some(""));
    }

    #[test]
    fn close_before_open_is_ignored() {
        let text = "</execute_python><execute_python>x = 1</execute_python>";
        assert_eq!(extract_code(text), Some("x = 1"));
    }

    #[test]
    fn gate_respects_the_flag_and_the_text() {
        let text = "<execute_python>print(1)</execute_python>";
        assert_eq!(runnable_code(true, Some(text)), Some("print(1)"));
        assert_eq!(runnable_code(false, Some(text)), None);
        assert_eq!(runnable_code(true, None), None);
        assert_eq!(runnable_code(true, Some("no code here")), None);
    }

    #[test]
    fn run_args_carry_the_limits() {
        let runner = CodeRunner::new(SandboxConfig::default());
        let args = runner.build_args("print('hi')");

        assert_eq!(args[0], "run");
        assert!(args.contains(&"--rm".to_string()));
        assert!(args.contains(&"none".to_string()));
        assert!(args.contains(&"128m".to_string()));
        assert!(args.contains(&"--cpus=0.5".to_string()));
        assert_eq!(args.last().unwrap(), "print('hi')");

        // The image must come before the interpreter invocation.
        let image_idx = args.iter().position(|a| a == "python:3.10-slim").unwrap();
        assert_eq!(args[image_idx + 1], "python");
        assert_eq!(args[image_idx + 2], "-c");
    }
}
