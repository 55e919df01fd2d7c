use anyhow::Context as _;
use medium_editor_core::EditorConfig;
use tracing_subscriber::EnvFilter;

mod session;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("reading editor config {path}"))?;
            EditorConfig::from_json_str(&raw).with_context(|| format!("parsing {path}"))?
        }
        None => EditorConfig {
            check_link_format: true,
            anchor_target: true,
            ..EditorConfig::default()
        },
    };

    let editor = session::run(config)?;
    for ix in 0..editor.elements().len() {
        if let Some(html) = editor.inner_html(ix) {
            println!("{html}");
        }
    }
    println!("{}", editor.document().to_json_pretty()?);
    Ok(())
}
