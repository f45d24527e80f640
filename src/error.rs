use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to access config {path}: {source}")]
    ConfigIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    ConfigParse(#[source] serde_json::Error),
    #[error("failed to read replay file {path}: {source}")]
    ReplayIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read replay stream: {0}")]
    ReplayRead(#[source] std::io::Error),
    #[error("bad replay record on line {line}: {source}")]
    Replay {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to spawn frame worker: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("frame pipeline is closed")]
    PipelineClosed,
}

pub type Result<T> = std::result::Result<T, Error>;
