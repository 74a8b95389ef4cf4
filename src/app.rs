//! Command line interface: argument parsing and the subcommands.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::{info, warn};

use chess_workbook::Config;
use chess_workbook::domain::{MovePair, ROOT_NODE_ID, ScoreSheet};
use chess_workbook::models::view_models::{BookmarkView, WorkbookSummary, board_text};
use chess_workbook::models::{Session, Workbook};
use chess_workbook::pgn::{ImportReport, build_export_text, build_workbook_text, import_pgn, parse_workbook_text};

#[derive(Parser, Debug)]
#[command(name = "chess-workbook", version, about = "Read, write and inspect chess workbook files")]
pub struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the chapters and article counts of a workbook
    Inspect {
        file: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Read a workbook and write it back in native form
    Resave {
        file: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Write a workbook as plain PGN
    Export(ExportArgs),
    /// List the bookmarks of a chapter, one page at a time
    Bookmarks {
        file: PathBuf,
        /// 1-based chapter number
        #[arg(long, default_value_t = 1)]
        chapter: usize,
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Create default bookmarks when the chapter has none
        #[arg(long)]
        generate: bool,
    },
    /// Print one line of a chapter's Study tree
    Line {
        file: PathBuf,
        #[arg(long, default_value_t = 1)]
        chapter: usize,
        /// Line id such as 1.2.1; the main line when omitted
        #[arg(long)]
        line: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Convert a PGN file with many games into a workbook
    Import {
        pgn: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value = "Imported Games")]
        title: String,
    },
    /// Print the JSON schema of the config file
    ConfigSchema,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    file: PathBuf,
    #[arg(short, long)]
    output: PathBuf,
    /// Drop comments
    #[arg(long)]
    no_comments: bool,
    /// Drop engine evaluations
    #[arg(long)]
    no_evaluations: bool,
}

pub fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Command::Inspect { file, json } => inspect(&file, json),
        Command::Resave { file, output } => {
            let workbook = read_workbook(&file)?;
            write_file(&output, &build_workbook_text(&workbook, config.line_width))
        }
        Command::Export(args) => export(args, &config),
        Command::Bookmarks {
            file,
            chapter,
            page,
            generate,
        } => bookmarks(&file, chapter, page, generate, config),
        Command::Line {
            file,
            chapter,
            line,
            json,
        } => print_line(&file, chapter, line.as_deref(), json),
        Command::Import { pgn, output, title } => {
            let text = fs::read_to_string(&pgn).with_context(|| format!("failed to read {}", pgn.display()))?;
            let (workbook, report) = import_pgn(&text, &title);
            report_skipped(&pgn, &report);
            if report.imported == 0 {
                bail!("no game could be imported from {}", pgn.display());
            }
            info!(games = report.imported, "imported");
            write_file(&output, &build_workbook_text(&workbook, config.line_width))
        }
        Command::ConfigSchema => {
            println!("{}", Config::json_schema()?);
            Ok(())
        }
    }
}

fn inspect(file: &Path, json: bool) -> Result<()> {
    let workbook = read_workbook(file)?;
    let summary = WorkbookSummary::new(&workbook);
    if json {
        return print_json(&summary);
    }
    println!("{} ({})", summary.title, summary.version);
    if !summary.author.is_empty() {
        println!("by {}", summary.author);
    }
    println!("training side: {:?}", summary.training_side);
    for chapter in &summary.chapters {
        println!(
            "{:>3}. {}: {} plies, {} model games, {} exercises, {} bookmarks{}",
            chapter.number,
            chapter.title,
            chapter.study_plies,
            chapter.model_games,
            chapter.exercises,
            chapter.bookmarks,
            if chapter.has_intro { ", intro" } else { "" },
        );
    }
    Ok(())
}

fn export(args: ExportArgs, config: &Config) -> Result<()> {
    let workbook = read_workbook(&args.file)?;
    let mut export = config.export;
    export.keep_comments &= !args.no_comments;
    export.keep_evaluations &= !args.no_evaluations;
    write_file(
        &args.output,
        &build_export_text(&workbook, export.profile(), config.line_width),
    )
}

fn bookmarks(file: &Path, chapter: usize, page: usize, generate: bool, config: Config) -> Result<()> {
    let workbook = read_workbook(file)?;
    let mut session = Session::new(workbook, config);
    if !session.select_chapter(chapter.saturating_sub(1)) {
        bail!("{} has no chapter {}", file.display(), chapter);
    }
    if generate && session.bookmarks().is_empty() {
        let added = session.generate_bookmarks();
        info!(added, "bookmarks generated");
    }
    let page = session.set_bookmark_page(page);
    let Some(active) = session.active_chapter() else {
        bail!("{} has no chapter {}", file.display(), chapter);
    };
    println!(
        "{}: page {} of {}",
        active.title,
        page,
        session.bookmarks().max_page()
    );
    for (index, bookmark) in session.current_bookmark_page() {
        let view = BookmarkView::new(active, index, bookmark);
        println!("{:>3}. {:<12} {:<16} line {}", index + 1, view.article, view.move_text, view.line_id);
    }
    Ok(())
}

#[derive(Serialize)]
struct LineView<'a> {
    line_id: &'a str,
    moves: &'a [MovePair],
    fen: String,
}

fn print_line(file: &Path, chapter: usize, line_id: Option<&str>, json: bool) -> Result<()> {
    let workbook = read_workbook(file)?;
    let Some(chapter) = workbook.chapter(chapter.saturating_sub(1)) else {
        bail!("{} has no chapter {}", file.display(), chapter);
    };
    let tree = &chapter.study.tree;
    let line_id = match line_id {
        Some(id) => id.to_string(),
        None => tree
            .get_default_line_id_for_node(ROOT_NODE_ID)
            .unwrap_or_else(|| "1".to_string()),
    };
    let nodes = tree.select_line(&line_id);
    if nodes.len() <= 1 {
        bail!("no line {} in chapter {}", line_id, chapter.title);
    }
    let mut sheet = ScoreSheet::new();
    sheet.set_node_list(tree, nodes);
    let Some(last) = sheet.last_node().and_then(|id| tree.get(id)) else {
        bail!("line {} is empty", line_id);
    };

    if json {
        return print_json(&LineView {
            line_id: &line_id,
            moves: sheet.move_list(),
            fen: chess_workbook::domain::chess::fen_of(&last.position),
        });
    }
    for pair in sheet.move_list() {
        let white = pair.white.as_ref().map_or("...", |p| p.text.as_str());
        let black = pair.black.as_ref().map_or("", |p| p.text.as_str());
        println!("{:>3}. {:<10} {}", pair.number, white, black);
    }
    println!();
    print!("{}", board_text(&last.position));
    Ok(())
}

fn read_workbook(path: &Path) -> Result<Workbook> {
    let text = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let (workbook, report) =
        parse_workbook_text(&text).with_context(|| format!("failed to parse {}", path.display()))?;
    report_skipped(path, &report);
    Ok(workbook)
}

fn report_skipped(path: &Path, report: &ImportReport) {
    if !report.has_errors() {
        return;
    }
    warn!(file = %path.display(), skipped = report.skipped, "some games were skipped");
    for error in &report.errors {
        eprintln!(
            "{}: game {} (line {}): {}",
            path.display(),
            error.index + 1,
            error.first_line,
            error.message
        );
    }
}

fn write_file(path: &Path, text: &str) -> Result<()> {
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!(file = %path.display(), bytes = text.len(), "written");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("failed to serialize output")?);
    Ok(())
}
