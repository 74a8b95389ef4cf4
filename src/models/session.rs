//! The working context: one workbook, the chapter and article being viewed
//! and the bookmark list of that chapter.
//!
//! Edits that can add or remove bookmarked nodes go through here so that
//! the registry always matches the node flags.

use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{NodeId, VariationTree};
use crate::error::{TreeError, TreeResult};

use super::bookmarks::{Bookmark, BookmarkRegistry};
use super::workbook::{ArticleLocation, Chapter, Workbook};

pub struct Session {
    workbook: Workbook,
    active_chapter: usize,
    active_location: ArticleLocation,
    bookmarks: BookmarkRegistry,
    config: Config,
}

impl Session {
    pub fn new(workbook: Workbook, config: Config) -> Self {
        let mut session = Self {
            workbook,
            active_chapter: 0,
            active_location: ArticleLocation::study(),
            bookmarks: BookmarkRegistry::new(config.bookmark_page_size),
            config,
        };
        session.rebuild_bookmarks();
        session
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn into_workbook(self) -> Workbook {
        self.workbook
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn bookmarks(&self) -> &BookmarkRegistry {
        &self.bookmarks
    }

    pub fn active_chapter_index(&self) -> usize {
        self.active_chapter
    }

    pub fn active_chapter(&self) -> Option<&Chapter> {
        self.workbook.chapter(self.active_chapter)
    }

    pub fn active_location(&self) -> ArticleLocation {
        self.active_location
    }

    /// Makes `index` the active chapter, shows its Study tree and rebuilds
    /// the bookmark list. Returns false if there is no such chapter.
    pub fn select_chapter(&mut self, index: usize) -> bool {
        if self.workbook.chapter(index).is_none() {
            return false;
        }
        self.active_chapter = index;
        self.active_location = ArticleLocation::study();
        self.rebuild_bookmarks();
        info!(chapter = index, "chapter selected");
        true
    }

    /// Switches to another article of the active chapter
    pub fn select_article(&mut self, location: ArticleLocation) -> bool {
        if self.tree_at(location).is_none() {
            return false;
        }
        self.active_location = location;
        true
    }

    pub fn tree_at(&self, location: ArticleLocation) -> Option<&VariationTree> {
        self.active_chapter()?.article(location).map(|a| &a.tree)
    }

    pub fn active_tree(&self) -> Option<&VariationTree> {
        self.tree_at(self.active_location)
    }

    /// Mutable access for edits that do not remove nodes or touch bookmarks,
    /// such as adding moves or comments.
    pub fn active_tree_mut(&mut self) -> Option<&mut VariationTree> {
        let location = self.active_location;
        self.workbook
            .chapter_mut(self.active_chapter)?
            .article_mut(location)
            .map(|a| &mut a.tree)
    }

    pub fn rebuild_bookmarks(&mut self) {
        match self.workbook.chapter(self.active_chapter) {
            Some(chapter) => self.bookmarks.build_list(chapter),
            None => self.bookmarks = BookmarkRegistry::new(self.config.bookmark_page_size),
        }
    }

    fn chapter_mut(&mut self) -> TreeResult<&mut Chapter> {
        let index = self.active_chapter;
        self.workbook
            .chapter_mut(index)
            .ok_or_else(|| TreeError::invalid_state(format!("no chapter {}", index)))
    }

    pub fn add_bookmark(&mut self, location: ArticleLocation, node_id: NodeId) -> bool {
        let index = self.active_chapter;
        match self.workbook.chapter_mut(index) {
            Some(chapter) => self.bookmarks.add(chapter, location, node_id),
            None => false,
        }
    }

    /// Removes the bookmark at `index` of the sorted list
    pub fn remove_bookmark(&mut self, index: usize) -> Option<Bookmark> {
        let chapter = self.workbook.chapter_mut(self.active_chapter)?;
        self.bookmarks.remove(chapter, index)
    }

    pub fn remove_all_bookmarks(&mut self) -> usize {
        match self.workbook.chapter_mut(self.active_chapter) {
            Some(chapter) => self.bookmarks.remove_all(chapter),
            None => 0,
        }
    }

    /// Removes every descendant of `node_id` and their bookmarks
    pub fn remove_tail_after(&mut self, location: ArticleLocation, node_id: NodeId) -> TreeResult<Vec<NodeId>> {
        let removed = article_tree(self.chapter_mut()?, location)?.remove_tail_after(node_id)?;
        let purged = self.bookmarks.purge(location, &removed);
        debug!(node = node_id, removed = removed.len(), purged, "tail removed");
        Ok(removed)
    }

    /// Removes `node_id` with its descendants and their bookmarks
    pub fn delete_subtree(&mut self, location: ArticleLocation, node_id: NodeId) -> TreeResult<Vec<NodeId>> {
        let removed = article_tree(self.chapter_mut()?, location)?.delete_subtree(node_id)?;
        let purged = self.bookmarks.purge(location, &removed);
        debug!(node = node_id, removed = removed.len(), purged, "subtree deleted");
        Ok(removed)
    }

    /// Creates default bookmarks in the active chapter's Study tree when it
    /// has none. Returns how many were added.
    pub fn generate_bookmarks(&mut self) -> usize {
        let side = self.workbook.training_side;
        let index = self.active_chapter;
        let Some(chapter) = self.workbook.chapter_mut(index) else {
            return 0;
        };
        let added = chapter.study.tree.generate_bookmarks(side).len();
        if added > 0 {
            self.bookmarks.build_list(chapter);
        }
        added
    }

    /// Bookmarks on the registry's current page with their index in the
    /// full list
    pub fn current_bookmark_page(&self) -> impl Iterator<Item = (usize, &Bookmark)> {
        let page = self.bookmarks.current_page();
        let offset = self.bookmarks.page_offset(page);
        self.bookmarks
            .page(page)
            .iter()
            .enumerate()
            .map(move |(i, b)| (offset + i, b))
    }

    pub fn set_bookmark_page(&mut self, page: usize) -> usize {
        self.bookmarks.set_page(page)
    }
}

fn article_tree(chapter: &mut Chapter, location: ArticleLocation) -> TreeResult<&mut VariationTree> {
    chapter
        .article_mut(location)
        .map(|a| &mut a.tree)
        .ok_or_else(|| TreeError::invalid_state(format!("no article at {:?}", location)))
}
