use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct LoggerConfig {
    level: Option<String>,
}

impl LoggerConfig {
    pub fn level(&self) -> Option<&str> {
        self.level.as_deref()
    }
}
