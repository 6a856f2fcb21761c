use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use anyhow::{Context as _, Result};
use clap::Parser;
use mlt_core::{
    config::EditorConfig,
    engine::Engine,
    key_event::InputEvent,
    model::EditorSnapshot,
    session::{Session, persist},
    vocabulary::VocabularySlot,
};
use mlt_vocab::TrieVocabulary;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// 终端里的多行提示词编辑器（逐行输入命令）。
#[derive(Debug, Parser)]
#[command(name = "mlt_cli", version)]
struct Args {
    /// 词表 TSV（term, frequency, alias, label, color）
    #[arg(long, env = "MLT_VOCAB")]
    vocab: Option<PathBuf>,
    /// JSON 格式的 EditorConfig
    #[arg(long)]
    config: Option<PathBuf>,
    /// 初始文本
    #[arg(long, default_value = "")]
    text: String,
    /// 初始列宽（覆盖配置里的 default_line_width）
    #[arg(long)]
    width: Option<usize>,
    /// 以 JSON 输出快照
    #[arg(long)]
    json: bool,
}

/// `:width N` 换算弹窗宽度时使用的字符度量。
const ADVANCE: f32 = 10.0;
const LINE_HEIGHT: f32 = 20.0;

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref())?;
    if let Some(width) = args.width {
        config.default_line_width = width.max(1);
    }

    let slot = VocabularySlot::new();
    let vocab_path = args.vocab.clone().unwrap_or_else(default_vocab_path);
    spawn_vocab_loader(vocab_path.clone(), slot.clone());

    let line_margin = config.line_margin;
    let engine = Engine::with_config(slot, config);
    let mut field = args.text.clone();
    let mut session = Session::open(engine, &field);

    repl(&mut session, &mut field, &vocab_path, line_margin, args.json)
}

fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<EditorConfig> {
    let config = match path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            EditorConfig::from_json_str(&raw)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => EditorConfig::default(),
    };
    let config = config.with_env_overrides(|key| std::env::var(key).ok());
    config.validate().context("invalid editor config")?;
    Ok(config)
}

fn default_vocab_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("asset")
        .join("vocab.tsv")
}

/// 后台加载词表；失败时只记日志，编辑器照常工作（没有候选）。
fn spawn_vocab_loader(path: PathBuf, slot: VocabularySlot) {
    thread::spawn(move || match TrieVocabulary::from_path(&path) {
        Ok(vocabulary) => slot.install(Arc::new(vocabulary)),
        Err(err) => tracing::warn!(%err, "vocabulary unavailable; autocomplete disabled"),
    });
}

enum Command {
    Event(InputEvent),
    Width(usize),
    Show,
    Quit,
}

fn parse_command(input: &str) -> Option<Command> {
    let Some(cmd) = input.strip_prefix(':') else {
        return Some(Command::Event(InputEvent::Paste(input.to_string())));
    };
    let mut parts = cmd.split_whitespace();
    let command = match parts.next()? {
        "tab" => Command::Event(InputEvent::Accept),
        "up" => Command::Event(InputEvent::SelectPrev),
        "down" => Command::Event(InputEvent::SelectNext),
        "bs" => Command::Event(InputEvent::Backspace),
        "del" => Command::Event(InputEvent::Delete),
        "left" => Command::Event(InputEvent::Left),
        "right" => Command::Event(InputEvent::Right),
        "home" => Command::Event(InputEvent::Home),
        "end" => Command::Event(InputEvent::End),
        "clear" => Command::Event(InputEvent::Clear),
        "show" => Command::Show,
        "width" => Command::Width(parts.next()?.parse().ok()?),
        "q" | "quit" | "exit" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

fn repl(
    session: &mut Session<VocabularySlot>,
    field: &mut String,
    vocab_path: &Path,
    line_margin: usize,
    json: bool,
) -> Result<()> {
    let stdin = io::stdin();
    let mut out = io::stdout().lock();
    writeln!(out, "mlt demo | vocab: {}", vocab_path.display())?;
    writeln!(
        out,
        "直接输入文本；:tab 接受 :up/:down 选择 :bs :del :left :right :home :end :width N :clear :show :q"
    )?;
    render(&mut out, &session.tick(), json)?;

    let mut line = String::new();
    loop {
        line.clear();
        write!(out, "mlt> ")?;
        out.flush()?;
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim_end_matches(['\r', '\n']);
        if input.is_empty() {
            continue;
        }

        let event = match parse_command(input) {
            Some(Command::Quit) => break,
            Some(Command::Show) => {
                render(&mut out, &session.tick(), json)?;
                continue;
            }
            Some(Command::Width(columns)) => InputEvent::Resize {
                popup_width: (columns.max(1) + line_margin) as f32 * ADVANCE,
                advance: ADVANCE,
                line_height: LINE_HEIGHT,
            },
            Some(Command::Event(event)) => event,
            None => {
                writeln!(out, "未知命令：{input}")?;
                continue;
            }
        };

        let (snapshot, actions) = session.handle(event);
        persist(&actions, field);
        render(&mut out, &snapshot, json)?;
    }

    writeln!(out, "final: {field}")?;
    Ok(())
}

fn render(out: &mut impl Write, snapshot: &EditorSnapshot, json: bool) -> Result<()> {
    if json {
        let line = serde_json::to_string(snapshot).context("failed to encode snapshot")?;
        writeln!(out, "{line}")?;
        return Ok(());
    }

    writeln!(out, "--------------------")?;
    for (row, text) in with_cursor_marker(&snapshot.display, snapshot.cursor)
        .split('\n')
        .enumerate()
    {
        writeln!(out, "{row:>3} | {text}")?;
    }
    writeln!(
        out,
        "    cursor {}:{} width {}",
        snapshot.row, snapshot.column, snapshot.line_width
    )?;
    if snapshot.candidates.is_empty() {
        return Ok(());
    }
    writeln!(out, "    word: {}", snapshot.word)?;
    for (i, candidate) in snapshot.candidates.iter().enumerate() {
        let marker = if candidate.selected { '>' } else { ' ' };
        writeln!(
            out,
            "  {marker} {:>2}. {}\t{}",
            i + 1,
            candidate.text,
            candidate.frequency_label
        )?;
    }
    Ok(())
}

fn with_cursor_marker(display: &str, cursor: usize) -> String {
    let mut out = String::with_capacity(display.len() + 1);
    let mut placed = false;
    for (i, ch) in display.chars().enumerate() {
        if i == cursor {
            out.push('|');
            placed = true;
        }
        out.push(ch);
    }
    if !placed {
        out.push('|');
    }
    out
}
