use async_trait::async_trait;
use protocol::{Command, CommandDecoder, Verb};
use relay::{CommandSink, OutputFormat, RelayConfig, RelayResult, WriterSink};
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Default)]
struct CollectingSink {
    commands: Vec<Command>,
    flushed: bool,
}

#[async_trait]
impl CommandSink for CollectingSink {
    async fn accept(&mut self, command: &Command) -> RelayResult<()> {
        self.commands.push(command.clone());
        Ok(())
    }

    async fn flush(&mut self) -> RelayResult<()> {
        self.flushed = true;
        Ok(())
    }

    fn sink_name(&self) -> &'static str {
        "collecting"
    }
}

const RAW_COMMANDS: &str = r#"series e:server001 m:disk_used_percent=20.5 m:disk_size_mb=10240 x:disk_size="10 GB" t:mount_point=/ t:disk_name=/sda1
series e:server001 ms:1000 m:cpu=12
property e:server001 t:disk ms:1000 k:name=sda1 v:size=10GB
message e:server001 ms:1000 t:severity=info m:"disk check done"
metric m:disk_used_percent p:float
entity e:server001 l:"Primary server"

series e:server001 ms:1000 m:cpu=high
"#;

#[tokio::test]
async fn test_pipeline_decodes_each_line() {
    let decoder = CommandDecoder::default();
    let mut sink = CollectingSink::default();

    let stats = relay::run(&decoder, RAW_COMMANDS.as_bytes(), &mut sink)
        .await
        .unwrap();

    assert_eq!(stats.lines, 8);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.typed, 4);
    assert_eq!(stats.pass_through, 3);
    assert!(sink.flushed);

    let verbs: Vec<Option<Verb>> = sink.commands.iter().map(Command::verb).collect();
    assert_eq!(
        verbs,
        vec![
            Some(Verb::Series),
            Some(Verb::Series),
            Some(Verb::Property),
            Some(Verb::Message),
            None,
            None,
            None,
        ]
    );

    let Command::MultipleInsert(multi) = &sink.commands[0] else {
        panic!("expected a multiple insert");
    };
    assert_eq!(multi.numeric_values["disk_size_mb"], 10240.0);
    assert_eq!(multi.text_values["disk_size"], "10 GB");
    assert_eq!(multi.tags["disk_name"], "/sda1");

    assert_eq!(
        sink.commands[6],
        Command::simple("series e:server001 ms:1000 m:cpu=high")
    );
}

#[tokio::test]
async fn test_pipeline_with_config_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[decoder]\ndelimiter = \";\"\n\n[output]\nformat = \"json\"").unwrap();

    let config = RelayConfig::load(file.path()).unwrap();
    assert_eq!(config.output.format, OutputFormat::Json);

    let decoder = CommandDecoder::new(config.decoder.clone()).unwrap();
    let mut sink = WriterSink::new(Vec::new(), config.output.format);
    let input = "message;e:s1;ms:5;m:hello world\n";

    let stats = relay::run(&decoder, input.as_bytes(), &mut sink)
        .await
        .unwrap();
    assert_eq!(stats.typed, 1);

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let row: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
    assert_eq!(row["type"], "message_insert");
    assert_eq!(row["entity"], "s1");
    assert_eq!(row["timestamp"], 5);
    assert_eq!(row["text"], "hello world");
}

#[test]
fn test_missing_config_file() {
    let result = RelayConfig::load(std::path::Path::new("/nonexistent/relay.toml"));
    assert!(matches!(result, Err(relay::RelayError::Io(_))));
}

#[test]
fn test_load_or_default_without_path() {
    let config = RelayConfig::load_or_default(None).unwrap();
    assert_eq!(config, RelayConfig::default());
}
