use caster_types::MatchDescriptor;
use std::path::{Path, PathBuf};

/// Fully resolved spectator client invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    /// Executable file name, also used to kill the client.
    pub executable: String,
    pub args: Vec<String>,
    /// Game install directory the client runs from.
    pub working_dir: PathBuf,
}

impl LaunchCommand {
    pub fn spectate(
        executable: &str,
        working_dir: &Path,
        game: &MatchDescriptor,
        locale: &str,
    ) -> Self {
        let creds = &game.credentials;
        let spectate_arg = format!(
            "spectator {}:{} {} {} {}",
            creds.host, creds.port, creds.encryption_key, game.match_id, game.region
        );

        Self {
            executable: executable.to_string(),
            args: vec![
                spectate_arg,
                "-UseRads".to_string(),
                "-GameBaseDir=..".to_string(),
                format!("-Locale={locale}"),
            ],
            working_dir: working_dir.to_path_buf(),
        }
    }

    /// Path of the executable inside the working directory.
    pub fn program(&self) -> PathBuf {
        self.working_dir.join(&self.executable)
    }

    /// Shell-style rendering with every part quoted, for logs.
    pub fn command_line(&self) -> String {
        std::iter::once(self.executable.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(|part| format!("\"{part}\""))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use caster_types::ObserverCredentials;

    #[test]
    fn command_line_matches_client_contract() {
        let game = MatchDescriptor {
            match_id: 6_512_345_678,
            region: "EUW1".to_string(),
            participants: vec![],
            credentials: ObserverCredentials {
                host: "spectator-consumer.euw1.lol.pvp.net".to_string(),
                port: 80,
                encryption_key: "AbCdEf==".to_string(),
            },
        };

        let cmd = LaunchCommand::spectate(
            "League of Legends.exe",
            Path::new("/games/lol/Game"),
            &game,
            "en_GB",
        );

        assert_eq!(
            cmd.command_line(),
            "\"League of Legends.exe\" \"spectator spectator-consumer.euw1.lol.pvp.net:80 AbCdEf== 6512345678 EUW1\" \"-UseRads\" \"-GameBaseDir=..\" \"-Locale=en_GB\""
        );
        assert_eq!(cmd.program(), Path::new("/games/lol/Game/League of Legends.exe"));
    }
}
