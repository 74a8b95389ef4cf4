//! The workbook file: a preface block followed by one block per article,
//! chapter by chapter. Also the plain PGN export and import.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::domain::chess::fen_of;
use crate::domain::header::*;
use crate::domain::{ContentType, VariationTree};
use crate::error::ParseError;
use crate::models::workbook::{Article, Chapter, Workbook, default_chapter_title};

use super::headers::{
    color_value, format_pgn_date, parse_color_value, parse_pgn_date, push_header, push_header_if_set,
};
use super::multi_game::{GameText, split_games};
use super::writer::{Profile, build_game_text};

const PREFACE_WHITE: &str = "CHESS FORGE";
const PREFACE_BLACK: &str = "WORKBOOK";
const STUDY_WHITE: &str = "CHAPTER";
const INTRO_WHITE: &str = "Chapter";
const INTRO_BLACK: &str = "Introduction";

/// A game that could not be read
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GameError {
    /// Position of the game in the file, starting at 0
    pub index: usize,
    /// 1-based line where the game starts
    pub first_line: usize,
    pub message: String,
}

/// Outcome of reading a file with many games. Bad games are skipped and
/// reported, they never abort the import.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub skipped: usize,
    pub errors: Vec<GameError>,
}

impl ImportReport {
    fn record_error(&mut self, index: usize, game: &GameText, err: &ParseError) {
        warn!(index, line = game.first_line, error = %err, "skipping game");
        self.skipped += 1;
        self.errors.push(GameError {
            index,
            first_line: game.first_line,
            message: err.to_string(),
        });
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

// Writing

/// Native workbook text: every annotation and command is kept.
pub fn build_workbook_text(workbook: &Workbook, line_width: usize) -> String {
    let mut out = build_preface(workbook);
    for chapter in &workbook.chapters {
        out.push_str(&build_study_block(chapter, line_width));
        if chapter.has_intro() {
            out.push_str(&build_intro_block(&chapter.intro, line_width));
        }
        for game in &chapter.model_games {
            out.push_str(&build_article_block(game, Profile::Native, line_width));
        }
        for exercise in &chapter.exercises {
            out.push_str(&build_article_block(exercise, Profile::Native, line_width));
        }
    }
    out
}

fn build_preface(workbook: &Workbook) -> String {
    let mut out = String::new();
    push_header(&mut out, KEY_WORKBOOK_TITLE, &workbook.title);
    push_header(&mut out, KEY_ANNOTATOR, &workbook.author);
    push_header(&mut out, KEY_WORKBOOK_VERSION, &workbook.version);
    push_header(&mut out, KEY_GUID, &workbook.guid);
    push_header(&mut out, KEY_TRAINING_SIDE, color_value(Some(workbook.training_side)));
    push_header(&mut out, KEY_STUDY_BOARD_ORIENTATION, color_value(workbook.study_orientation));
    push_header(&mut out, KEY_GAME_BOARD_ORIENTATION, color_value(workbook.game_orientation));
    push_header(
        &mut out,
        KEY_EXERCISE_BOARD_ORIENTATION,
        color_value(workbook.exercise_orientation),
    );
    if let Some(date) = workbook.last_update {
        push_header(&mut out, KEY_DATE, &format_pgn_date(date));
    }
    push_header(&mut out, KEY_WHITE, PREFACE_WHITE);
    push_header(&mut out, KEY_BLACK, PREFACE_BLACK);
    push_header(&mut out, KEY_RESULT, NO_RESULT);
    out.push_str("\n*\n\n");
    out
}

fn push_preamble(out: &mut String, tree: &VariationTree) {
    for line in tree.header.preamble() {
        push_header(out, KEY_PREAMBLE, line);
    }
}

/// Header lines, a blank line, the wrapped move text and the result
fn finish_block(mut out: String, tree: &VariationTree, profile: Profile, line_width: usize, result: &str) -> String {
    out.push('\n');
    out.push_str(&build_game_text(tree, profile, line_width));
    out.push(' ');
    out.push_str(result);
    out.push_str("\n\n");
    out
}

fn build_study_block(chapter: &Chapter, line_width: usize) -> String {
    let mut out = String::new();
    push_header(&mut out, KEY_CHAPTER_TITLE, &chapter.title);
    push_header(&mut out, KEY_GUID, &chapter.guid);
    push_header(&mut out, KEY_ANNOTATOR, &chapter.author);
    push_header(&mut out, KEY_CONTENT_TYPE, ContentType::Study.header_value());
    push_header(&mut out, KEY_WHITE, STUDY_WHITE);
    push_header(&mut out, KEY_BLACK, &chapter.title);
    push_header(&mut out, KEY_RESULT, NO_RESULT);
    push_preamble(&mut out, &chapter.study.tree);
    finish_block(out, &chapter.study.tree, Profile::Native, line_width, NO_RESULT)
}

fn build_intro_block(intro: &Article, line_width: usize) -> String {
    let mut out = String::new();
    push_header(&mut out, KEY_GUID, &intro.guid);
    push_header(&mut out, KEY_CONTENT_TYPE, ContentType::Intro.header_value());
    push_header(&mut out, KEY_WHITE, INTRO_WHITE);
    push_header(&mut out, KEY_BLACK, INTRO_BLACK);
    push_header(&mut out, KEY_RESULT, NO_RESULT);
    finish_block(out, &intro.tree, Profile::Native, line_width, NO_RESULT)
}

/// Model game or exercise block
fn build_article_block(article: &Article, profile: Profile, line_width: usize) -> String {
    let tree = &article.tree;
    let header = &tree.header;
    let native = profile == Profile::Native;
    let mut out = String::new();

    if native {
        push_header(&mut out, KEY_CONTENT_TYPE, tree.content_type().header_value());
    }
    push_header(&mut out, KEY_EVENT, header.get_or_empty(KEY_EVENT));
    push_header_if_set(&mut out, KEY_SITE, header.get_or_empty(KEY_SITE));
    push_header_if_set(&mut out, KEY_ROUND, header.get_or_empty(KEY_ROUND));
    push_header_if_set(&mut out, KEY_ECO, header.get_or_empty(KEY_ECO));
    if tree.content_type() == ContentType::ModelGame {
        push_header_if_set(&mut out, KEY_LICHESS_ID, header.get_or_empty(KEY_LICHESS_ID));
        push_header_if_set(&mut out, KEY_CHESSCOM_ID, header.get_or_empty(KEY_CHESSCOM_ID));
    }
    if native {
        push_header(&mut out, KEY_GUID, &article.guid);
    }
    push_header(&mut out, KEY_DATE, header.get_or_empty(KEY_DATE));
    push_header(&mut out, KEY_WHITE, header.get_or_empty(KEY_WHITE));
    push_header(&mut out, KEY_BLACK, header.get_or_empty(KEY_BLACK));
    push_header_if_set(&mut out, KEY_WHITE_ELO, header.get_or_empty(KEY_WHITE_ELO));
    push_header_if_set(&mut out, KEY_BLACK_ELO, header.get_or_empty(KEY_BLACK_ELO));
    push_header_if_set(&mut out, KEY_ANNOTATOR, header.get_or_empty(KEY_ANNOTATOR));
    push_header(&mut out, KEY_RESULT, header.result());
    if tree.content_type() == ContentType::Exercise {
        push_header(&mut out, KEY_FEN, &fen_of(&tree.root().position));
    }
    if native {
        push_preamble(&mut out, tree);
    }
    finish_block(out, tree, profile, line_width, header.result())
}

/// Plain PGN for other programs: per chapter the Intro, the Study tree,
/// the model games and the exercises, without private commands.
pub fn build_export_text(workbook: &Workbook, profile: Profile, line_width: usize) -> String {
    let mut out = String::new();
    for chapter in &workbook.chapters {
        if chapter.has_intro() {
            out.push_str(&build_export_chapter_block(
                chapter,
                &chapter.intro.tree,
                (INTRO_WHITE, INTRO_BLACK),
                profile,
                line_width,
            ));
        }
        out.push_str(&build_export_chapter_block(
            chapter,
            &chapter.study.tree,
            (STUDY_WHITE, chapter.title.as_str()),
            profile,
            line_width,
        ));
        for article in chapter.model_games.iter().chain(&chapter.exercises) {
            out.push_str(&build_article_block(article, profile, line_width));
        }
    }
    out
}

fn build_export_chapter_block(
    chapter: &Chapter,
    tree: &VariationTree,
    (white, black): (&str, &str),
    profile: Profile,
    line_width: usize,
) -> String {
    let mut out = String::new();
    push_header(&mut out, KEY_EVENT, &chapter.title);
    push_header(&mut out, KEY_WHITE, white);
    push_header(&mut out, KEY_BLACK, black);
    push_header_if_set(&mut out, KEY_ANNOTATOR, &chapter.author);
    push_header(&mut out, KEY_RESULT, NO_RESULT);
    finish_block(out, tree, profile, line_width, NO_RESULT)
}

// Reading

/// Reads a workbook file. Games that fail to parse are skipped and listed in
/// the report; only a missing preface fails the whole read.
pub fn parse_workbook_text(text: &str) -> Result<(Workbook, ImportReport), ParseError> {
    let games = split_games(text);
    let Some(preface) = games.first().filter(|g| g.header.get(KEY_WORKBOOK_TITLE).is_some()) else {
        return Err(ParseError::NotAWorkbook);
    };
    let mut workbook = read_preface(preface);
    let mut report = ImportReport::default();

    for (index, game) in games.iter().enumerate().skip(1) {
        let content_type = game.content_type().unwrap_or(ContentType::ModelGame);
        let tree = match game.parse(content_type) {
            Ok(tree) => tree,
            Err(err) => {
                // the chapter still exists so that its other articles land in it
                if content_type == ContentType::Study {
                    let chapter = chapter_from_header(&game.header, workbook.chapters.len() + 1);
                    workbook.add_chapter(chapter);
                }
                report.record_error(index, game, &err);
                continue;
            }
        };

        match content_type {
            ContentType::Study => {
                let mut chapter = chapter_from_header(&tree.header, workbook.chapters.len() + 1);
                chapter.study = Article::from_tree(tree);
                workbook.add_chapter(chapter);
            }
            ContentType::Intro => workbook.last_chapter_or_default().intro = Article::from_tree(tree),
            ContentType::ModelGame => workbook
                .last_chapter_or_default()
                .model_games
                .push(Article::from_tree(tree)),
            ContentType::Exercise => workbook
                .last_chapter_or_default()
                .exercises
                .push(Article::from_tree(tree)),
        }
        report.imported += 1;
    }

    info!(
        chapters = workbook.chapters.len(),
        imported = report.imported,
        skipped = report.skipped,
        "workbook read"
    );
    Ok((workbook, report))
}

/// Chapter `number` (1-based) with title, guid and author taken from the
/// header of its Study block
fn chapter_from_header(header: &GameHeader, number: usize) -> Chapter {
    let title = header
        .get(KEY_CHAPTER_TITLE)
        .or_else(|| header.get(KEY_BLACK))
        .map_or_else(|| default_chapter_title(number), str::to_string);
    let mut chapter = Chapter::new(title);
    if let Some(guid) = header.guid() {
        chapter.guid = guid.to_string();
        chapter.study.guid = guid.to_string();
    }
    chapter.author = header.get_or_empty(KEY_ANNOTATOR).to_string();
    chapter
}

fn read_preface(preface: &GameText) -> Workbook {
    let header = &preface.header;
    let mut workbook = Workbook::new(header.get_or_empty(KEY_WORKBOOK_TITLE));
    workbook.author = header.get_or_empty(KEY_ANNOTATOR).to_string();
    if let Some(version) = header.get(KEY_WORKBOOK_VERSION) {
        workbook.version = version.to_string();
    }
    if let Some(guid) = header.guid() {
        workbook.guid = guid.to_string();
    }
    if let Some(side) = parse_color_value(header.get_or_empty(KEY_TRAINING_SIDE)) {
        workbook.training_side = side;
    }
    workbook.study_orientation = parse_color_value(header.get_or_empty(KEY_STUDY_BOARD_ORIENTATION));
    workbook.game_orientation = parse_color_value(header.get_or_empty(KEY_GAME_BOARD_ORIENTATION));
    workbook.exercise_orientation =
        parse_color_value(header.get_or_empty(KEY_EXERCISE_BOARD_ORIENTATION));
    workbook.last_update = header.get(KEY_DATE).and_then(parse_pgn_date);
    debug!(title = %workbook.title, version = %workbook.version, "read preface");
    workbook
}

/// Reads plain PGN into a new workbook with a single chapter. Games with a
/// FEN header become exercises, the rest model games.
pub fn import_pgn(text: &str, title: &str) -> (Workbook, ImportReport) {
    let mut workbook = Workbook::new(title);
    let mut report = ImportReport::default();
    let chapter = workbook.last_chapter_or_default();

    for (index, game) in split_games(text).iter().enumerate() {
        match game.parse(ContentType::ModelGame) {
            Ok(tree) => {
                chapter.add_article(Article::from_tree(tree));
                report.imported += 1;
            }
            Err(err) => report.record_error(index, game, &err),
        }
    }
    info!(imported = report.imported, skipped = report.skipped, "pgn imported");
    (workbook, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PieceColor, ROOT_NODE_ID};

    fn sample_workbook() -> Workbook {
        let mut wb = Workbook::new("Open Games");
        wb.author = "Coach".to_string();
        wb.training_side = PieceColor::Black;
        wb.study_orientation = Some(PieceColor::Black);

        let mut chapter = Chapter::new("Italian");
        let tree = &mut chapter.study.tree;
        let e4 = tree.add_move(ROOT_NODE_ID, "e4").unwrap();
        let e5 = tree.add_move(e4, "e5").unwrap();
        tree.add_move(e5, "Nf3").unwrap();
        tree.set_bookmark(e5, true);
        chapter.intro.tree.get_mut(ROOT_NODE_ID).unwrap().annotations.comment =
            Some("Read this first".to_string());

        let mut game = Article::new(ContentType::ModelGame);
        game.tree.header.set(KEY_WHITE, "Greco");
        game.tree.header.set(KEY_RESULT, "1-0");
        game.tree.add_move(ROOT_NODE_ID, "d4").unwrap();
        chapter.model_games.push(game);

        let mut exercise = Article {
            guid: "ex-1".to_string(),
            tree: VariationTree::from_fen(ContentType::Exercise, "k7/8/8/8/8/8/8/K6R w - - 0 1").unwrap(),
        };
        exercise.tree.add_move(ROOT_NODE_ID, "Rh8+").unwrap();
        chapter.exercises.push(exercise);

        wb.add_chapter(chapter);
        wb
    }

    #[test]
    fn test_preface() {
        let text = build_workbook_text(&sample_workbook(), 80);
        assert!(text.starts_with("[ChessForgeWorkbook \"Open Games\"]\n[Annotator \"Coach\"]\n"));
        assert!(text.contains("[TrainingSide \"Black\"]\n[StudyBoardOrientation \"Black\"]\n[GameBoardOrientation \"None\"]"));
        assert!(text.contains("[Result \"*\"]\n\n*\n\n[ChapterTitle \"Italian\"]"));
    }

    #[test]
    fn test_read_back() {
        let wb = sample_workbook();
        let text = build_workbook_text(&wb, 80);
        let (read, report) = parse_workbook_text(&text).unwrap();
        assert!(!report.has_errors(), "{:?}", report);
        assert_eq!(report.imported, 4);

        assert_eq!(read.title, "Open Games");
        assert_eq!(read.guid, wb.guid);
        assert_eq!(read.training_side, PieceColor::Black);
        assert_eq!(read.study_orientation, Some(PieceColor::Black));
        assert_eq!(read.game_orientation, None);

        let chapter = &read.chapters[0];
        assert_eq!(chapter.title, "Italian");
        assert_eq!(chapter.guid, wb.chapters[0].guid);
        assert_eq!(chapter.study.tree.len(), 4);
        assert_eq!(chapter.study.tree.bookmarked_nodes().len(), 1);
        assert_eq!(chapter.intro.intro_text(), Some("Read this first"));
        assert_eq!(chapter.model_games.len(), 1);
        assert_eq!(chapter.model_games[0].tree.header.result(), "1-0");
        assert_eq!(chapter.exercises[0].guid, "ex-1");
        assert_eq!(
            fen_of(&chapter.exercises[0].tree.root().position),
            "k7/8/8/8/8/8/8/K6R w - - 0 1"
        );

        assert_eq!(build_workbook_text(&read, 80), text);
    }

    #[test]
    fn test_not_a_workbook() {
        assert_eq!(
            parse_workbook_text("[Event \"x\"]\n\n1. e4 *\n").unwrap_err(),
            ParseError::NotAWorkbook
        );
    }

    #[test]
    fn test_bad_game_is_reported() {
        let mut text = build_workbook_text(&sample_workbook(), 80);
        text.push_str("[ContentType \"Model Game\"]\n[Event \"broken\"]\n\n1. e4 e5 2. Ke3 *\n");
        let (read, report) = parse_workbook_text(&text).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors[0].index, 5);
        assert!(report.errors[0].message.contains("Ke3"));
        assert_eq!(read.chapters[0].model_games.len(), 1);
    }

    #[test]
    fn test_bad_study_keeps_its_chapter() {
        let mut wb = sample_workbook();
        let mut second = Chapter::new("Two");
        second.study.tree.add_move(ROOT_NODE_ID, "d4").unwrap();
        let mut game = Article::new(ContentType::ModelGame);
        game.tree.add_move(ROOT_NODE_ID, "c4").unwrap();
        second.model_games.push(game);
        let second_guid = second.guid.clone();
        wb.add_chapter(second);

        let text = build_workbook_text(&wb, 80).replace("\n1. d4 *", "\n1. Ke5 *");
        let (read, report) = parse_workbook_text(&text).unwrap();
        assert_eq!(report.skipped, 1);
        assert!(report.errors[0].message.contains("Ke5"));
        assert_eq!(read.chapters.len(), 2);
        assert_eq!(read.chapters[0].model_games.len(), 1);
        let two = &read.chapters[1];
        assert_eq!(two.title, "Two");
        assert_eq!(two.guid, second_guid);
        assert_eq!(two.study.tree.len(), 1);
        assert_eq!(two.model_games.len(), 1);
    }

    #[test]
    fn test_export_drops_private_data() {
        let text = build_export_text(
            &sample_workbook(),
            Profile::Export {
                keep_comments: true,
                keep_evaluations: true,
            },
            80,
        );
        assert!(!text.contains("chf-bkm"));
        assert!(!text.contains("ContentType"));
        assert!(!text.contains("Guid"));
        let intro = text.find("Read this first").unwrap();
        let study = text.find("[Black \"Italian\"]").unwrap();
        assert!(intro < study);
        assert!(text.contains("[FEN \"k7/8/8/8/8/8/8/K6R w - - 0 1\"]"));
    }

    #[test]
    fn test_import_pgn() {
        let pgn = "[Event \"A\"]\n\n1. e4 e5 *\n\n[Event \"B\"]\n[FEN \"k7/8/8/8/8/8/8/K6R w - - 0 1\"]\n\n1. Rh8+ *\n\n[Event \"C\"]\n\n1. e4 {open *\n";
        let (wb, report) = import_pgn(pgn, "Imported");
        assert_eq!(report.imported, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors[0].first_line, 10);
        let chapter = &wb.chapters[0];
        assert_eq!(chapter.model_games.len(), 1);
        assert_eq!(chapter.exercises.len(), 1);
    }
}
