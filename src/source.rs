//! Newline-delimited JSON log record source

use crate::adapter::LogStream;
use crate::errors::Result;
use crate::message::LogRecord;

use futures::StreamExt;
use futures::stream;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, warn};

/// Stream of records read line by line from `reader`.
///
/// Blank lines are ignored and malformed lines are logged and skipped. The
/// stream ends at EOF or on the first read error.
pub fn ndjson_records<R>(reader: R) -> LogStream
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    stream::unfold(reader.lines(), |mut lines| async move {
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    match serde_json::from_str::<LogRecord>(line) {
                        Ok(record) => return Some((record, lines)),
                        Err(e) => warn!("Skipping malformed log record: {}", e),
                    }
                }
                Ok(None) => return None,
                Err(e) => {
                    error!("Failed to read log records: {}", e);
                    return None;
                }
            }
        }
    })
    .boxed()
}

/// Records from `path`, or from stdin when no path is given
pub async fn open(path: Option<&Path>) -> Result<LogStream> {
    match path {
        Some(path) => {
            let file = File::open(path).await?;
            Ok(ndjson_records(BufReader::new(file)))
        }
        None => Ok(ndjson_records(BufReader::new(tokio::io::stdin()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_reads_records_and_skips_bad_lines() {
        let input = concat!(
            r#"{"message": "first", "container": {"id": "a", "image": "nginx", "env": ["SERVICE_NAME=web"]}}"#,
            "\n",
            "\n",
            "not json\n",
            r#"{"message": "second", "container": {"id": "b", "image": "redis"}, "source": "stderr"}"#,
            "\n",
        );

        let records: Vec<LogRecord> = ndjson_records(input.as_bytes()).collect().await;

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].message, "first");
        assert_eq!(records[0].container.env, vec!["SERVICE_NAME=web"]);
        assert_eq!(records[1].container.id, "b");
        assert_eq!(records[1].source, "stderr");
    }

    #[tokio::test]
    async fn test_open_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"{{"message": "from file", "container": {{"id": "c", "image": "alpine"}}}}"#
        )
        .unwrap();

        let records: Vec<LogRecord> = open(Some(file.path())).await.unwrap().collect().await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].message, "from file");
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let result = open(Some(Path::new("/nonexistent/records.ndjson"))).await;
        assert!(result.is_err());
    }
}
