//! Platform detection for running shell commands

use std::env;

/// Shell used to interpret string commands on the current platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInfo {
    /// Shell executable (e.g., "sh", "cmd")
    pub program: &'static str,
    /// Flag that makes the shell execute its next argument
    pub flag: &'static str,
}

impl ShellInfo {
    /// Detect the current platform's shell
    pub fn current() -> Self {
        Self::from_os(env::consts::OS)
    }

    /// Create shell info from an OS string
    pub fn from_os(os: &str) -> Self {
        match os {
            "windows" => Self {
                program: "cmd",
                flag: "/C",
            },
            _ => Self {
                program: "sh",
                flag: "-c",
            },
        }
    }

    /// Build a process command that runs `cmd` through this shell
    pub fn command(&self, cmd: &str) -> tokio::process::Command {
        let mut command = tokio::process::Command::new(self.program);
        command.arg(self.flag).arg(cmd);
        command
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let shell = ShellInfo::current();
        assert!(!shell.program.is_empty());
        assert!(!shell.flag.is_empty());
    }

    #[test]
    fn test_linux() {
        let shell = ShellInfo::from_os("linux");
        assert_eq!(shell.program, "sh");
        assert_eq!(shell.flag, "-c");
    }

    #[test]
    fn test_macos() {
        assert_eq!(ShellInfo::from_os("macos"), ShellInfo::from_os("linux"));
    }

    #[test]
    fn test_windows() {
        let shell = ShellInfo::from_os("windows");
        assert_eq!(shell.program, "cmd");
        assert_eq!(shell.flag, "/C");
    }
}
