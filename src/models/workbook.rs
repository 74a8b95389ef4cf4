//! Workbook, chapters and the articles (trees) they hold.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{ContentType, PieceColor, VariationTree};

/// Version written to new workbook files
pub const WORKBOOK_VERSION: &str = "2.0";

pub fn new_guid() -> String {
    Uuid::new_v4().to_string()
}

/// Where an article sits inside a chapter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ArticleLocation {
    pub content_type: ContentType,
    /// Index into the model game or exercise list; `None` for the Study
    /// tree and the Intro
    pub article_index: Option<usize>,
}

impl ArticleLocation {
    pub fn study() -> Self {
        Self {
            content_type: ContentType::Study,
            article_index: None,
        }
    }

    pub fn intro() -> Self {
        Self {
            content_type: ContentType::Intro,
            article_index: None,
        }
    }

    pub fn model_game(index: usize) -> Self {
        Self {
            content_type: ContentType::ModelGame,
            article_index: Some(index),
        }
    }

    pub fn exercise(index: usize) -> Self {
        Self {
            content_type: ContentType::Exercise,
            article_index: Some(index),
        }
    }
}

/// One tree with its identity
#[derive(Clone, Debug)]
pub struct Article {
    pub guid: String,
    pub tree: VariationTree,
}

impl Article {
    pub fn new(content_type: ContentType) -> Self {
        Self::from_tree(VariationTree::new(content_type))
    }

    /// Wraps a tree, taking the guid from its header or creating one
    pub fn from_tree(tree: VariationTree) -> Self {
        let guid = tree.header.guid().map_or_else(new_guid, str::to_string);
        Self { guid, tree }
    }

    pub fn content_type(&self) -> ContentType {
        self.tree.content_type()
    }

    /// Intro text, stored as the comment of the root node
    pub fn intro_text(&self) -> Option<&str> {
        self.tree
            .root()
            .annotations
            .comment
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}

#[derive(Clone, Debug)]
pub struct Chapter {
    pub guid: String,
    pub title: String,
    pub author: String,
    pub study: Article,
    pub intro: Article,
    pub model_games: Vec<Article>,
    pub exercises: Vec<Article>,
}

impl Chapter {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            guid: new_guid(),
            title: title.into(),
            author: String::new(),
            study: Article::new(ContentType::Study),
            intro: Article::new(ContentType::Intro),
            model_games: Vec::new(),
            exercises: Vec::new(),
        }
    }

    pub fn article(&self, location: ArticleLocation) -> Option<&Article> {
        match (location.content_type, location.article_index) {
            (ContentType::Study, _) => Some(&self.study),
            (ContentType::Intro, _) => Some(&self.intro),
            (ContentType::ModelGame, Some(i)) => self.model_games.get(i),
            (ContentType::Exercise, Some(i)) => self.exercises.get(i),
            (ContentType::ModelGame | ContentType::Exercise, None) => None,
        }
    }

    pub fn article_mut(&mut self, location: ArticleLocation) -> Option<&mut Article> {
        match (location.content_type, location.article_index) {
            (ContentType::Study, _) => Some(&mut self.study),
            (ContentType::Intro, _) => Some(&mut self.intro),
            (ContentType::ModelGame, Some(i)) => self.model_games.get_mut(i),
            (ContentType::Exercise, Some(i)) => self.exercises.get_mut(i),
            (ContentType::ModelGame | ContentType::Exercise, None) => None,
        }
    }

    /// Adds an article to the list matching its content type and returns
    /// its location. A Study or Intro replaces the current one.
    pub fn add_article(&mut self, article: Article) -> ArticleLocation {
        match article.content_type() {
            ContentType::Study => {
                self.study = article;
                ArticleLocation::study()
            }
            ContentType::Intro => {
                self.intro = article;
                ArticleLocation::intro()
            }
            ContentType::ModelGame => {
                self.model_games.push(article);
                ArticleLocation::model_game(self.model_games.len() - 1)
            }
            ContentType::Exercise => {
                self.exercises.push(article);
                ArticleLocation::exercise(self.exercises.len() - 1)
            }
        }
    }

    pub fn has_intro(&self) -> bool {
        self.intro.intro_text().is_some()
    }

    /// Number of articles of each kind: (model games, exercises)
    pub fn article_counts(&self) -> (usize, usize) {
        (self.model_games.len(), self.exercises.len())
    }
}

#[derive(Clone, Debug)]
pub struct Workbook {
    pub title: String,
    pub author: String,
    pub version: String,
    pub guid: String,
    pub training_side: PieceColor,
    pub study_orientation: Option<PieceColor>,
    pub game_orientation: Option<PieceColor>,
    pub exercise_orientation: Option<PieceColor>,
    pub last_update: Option<NaiveDate>,
    pub chapters: Vec<Chapter>,
}

impl Workbook {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: String::new(),
            version: WORKBOOK_VERSION.to_string(),
            guid: new_guid(),
            training_side: PieceColor::White,
            study_orientation: None,
            game_orientation: None,
            exercise_orientation: None,
            last_update: None,
            chapters: Vec::new(),
        }
    }

    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    pub fn chapter_mut(&mut self, index: usize) -> Option<&mut Chapter> {
        self.chapters.get_mut(index)
    }

    /// Appends a chapter and returns its index
    pub fn add_chapter(&mut self, chapter: Chapter) -> usize {
        self.chapters.push(chapter);
        self.chapters.len() - 1
    }

    /// The last chapter, created with a default title if there is none
    pub fn last_chapter_or_default(&mut self) -> &mut Chapter {
        if self.chapters.is_empty() {
            self.chapters.push(Chapter::new(default_chapter_title(1)));
        }
        let last = self.chapters.len() - 1;
        &mut self.chapters[last]
    }
}

pub fn default_chapter_title(number: usize) -> String {
    format!("Chapter {}", number)
}
