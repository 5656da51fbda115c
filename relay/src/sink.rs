use crate::config::OutputFormat;
use crate::error::RelayResult;
use async_trait::async_trait;
use protocol::Command;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Destination for decoded commands
#[async_trait]
pub trait CommandSink: Send {
    async fn accept(&mut self, command: &Command) -> RelayResult<()>;

    async fn flush(&mut self) -> RelayResult<()>;

    fn sink_name(&self) -> &'static str;
}

/// Writes each command as one line of text or JSON
pub struct WriterSink<W> {
    writer: W,
    format: OutputFormat,
}

impl<W> WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn render(&self, command: &Command) -> RelayResult<String> {
        let mut line = match self.format {
            OutputFormat::Text => command.compose(),
            OutputFormat::Json => serde_json::to_string(command)?,
        };
        line.push('\n');
        Ok(line)
    }
}

#[async_trait]
impl<W> CommandSink for WriterSink<W>
where
    W: AsyncWrite + Unpin + Send,
{
    async fn accept(&mut self, command: &Command) -> RelayResult<()> {
        let line = self.render(command)?;
        self.writer.write_all(line.as_bytes()).await?;
        Ok(())
    }

    async fn flush(&mut self) -> RelayResult<()> {
        self.writer.flush().await?;
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        match self.format {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::CommandDecoder;

    #[tokio::test]
    async fn test_text_sink() {
        let decoder = CommandDecoder::default();
        let mut sink = WriterSink::new(Vec::new(), OutputFormat::Text);

        sink.accept(&decoder.decode("property e:s1 t:status ms:1 v:ok=true"))
            .await
            .unwrap();
        sink.accept(&decoder.decode("entity e:s1 l:label"))
            .await
            .unwrap();
        sink.flush().await.unwrap();

        assert_eq!(sink.sink_name(), "text");
        let output = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            output,
            "property e:s1 t:status ms:1 v:ok=true\nentity e:s1 l:label\n"
        );
    }

    #[tokio::test]
    async fn test_json_sink() {
        let decoder = CommandDecoder::default();
        let mut sink = WriterSink::new(Vec::new(), OutputFormat::Json);

        sink.accept(&decoder.decode("message e:s1 ms:1 m:hi"))
            .await
            .unwrap();
        sink.accept(&decoder.decode("bogus line")).await.unwrap();

        assert_eq!(sink.sink_name(), "json");
        let output = String::from_utf8(sink.into_inner()).unwrap();
        let rows: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["type"], "message_insert");
        assert_eq!(rows[0]["text"], "hi");
        assert_eq!(rows[1]["type"], "simple");
        assert_eq!(rows[1]["raw"], "bogus line");
    }
}
