//! Bookmarks of one chapter: a sorted, paged index over the nodes flagged
//! as bookmarks in its trees.
//!
//! The registry and the node flags are only changed together, so a node is
//! bookmarked exactly when it appears once in the list.

use tracing::debug;

use crate::config::DEFAULT_BOOKMARK_PAGE_SIZE;
use crate::domain::{ContentType, NodeId, PieceColor, TreeNode};

use super::workbook::{ArticleLocation, Chapter};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bookmark {
    pub location: ArticleLocation,
    pub node_id: NodeId,
    pub move_number: u32,
    /// Side to move in the bookmarked position
    pub color: PieceColor,
}

impl Bookmark {
    fn new(location: ArticleLocation, node: &TreeNode) -> Self {
        Self {
            location,
            node_id: node.id,
            move_number: node.move_number(),
            color: node.color_to_move(),
        }
    }

    fn sort_key(&self) -> (u32, bool) {
        (self.move_number, !self.color.is_white())
    }
}

#[derive(Clone, Debug)]
pub struct BookmarkRegistry {
    bookmarks: Vec<Bookmark>,
    page_size: usize,
    /// 1-based
    current_page: usize,
}

impl Default for BookmarkRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_BOOKMARK_PAGE_SIZE)
    }
}

impl BookmarkRegistry {
    pub fn new(page_size: usize) -> Self {
        Self {
            bookmarks: Vec::new(),
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    /// Rebuilds the list from the Study tree, the model games and the
    /// exercises of `chapter`, in that order, then sorts it.
    pub fn build_list(&mut self, chapter: &Chapter) {
        self.bookmarks.clear();
        let articles = std::iter::once((ArticleLocation::study(), &chapter.study))
            .chain(
                chapter
                    .model_games
                    .iter()
                    .enumerate()
                    .map(|(i, a)| (ArticleLocation::model_game(i), a)),
            )
            .chain(
                chapter
                    .exercises
                    .iter()
                    .enumerate()
                    .map(|(i, a)| (ArticleLocation::exercise(i), a)),
            );
        for (location, article) in articles {
            self.bookmarks.extend(
                article
                    .tree
                    .nodes()
                    .filter(|n| n.is_bookmark())
                    .map(|n| Bookmark::new(location, n)),
            );
        }
        self.sort();
        self.current_page = self.current_page.min(self.max_page());
        debug!(count = self.bookmarks.len(), "bookmark list built");
    }

    /// Orders by move number, then White to move before Black to move.
    /// Equal keys keep their order.
    pub fn sort(&mut self) {
        self.bookmarks.sort_by_key(Bookmark::sort_key);
    }

    /// Bookmarks `node_id` in the article at `location`. Returns false if the
    /// node does not exist or is already bookmarked.
    pub fn add(&mut self, chapter: &mut Chapter, location: ArticleLocation, node_id: NodeId) -> bool {
        let Some(article) = chapter.article_mut(location) else {
            return false;
        };
        if location.content_type == ContentType::Intro || !article.tree.set_bookmark(node_id, true) {
            return false;
        }
        let Some(node) = article.tree.get(node_id) else {
            return false;
        };
        self.bookmarks.push(Bookmark::new(location, node));
        self.sort();
        debug!(node = node_id, ?location, "bookmark added");
        true
    }

    /// Removes the bookmark at `index` in the sorted list and clears the
    /// node's flag.
    pub fn remove(&mut self, chapter: &mut Chapter, index: usize) -> Option<Bookmark> {
        if index >= self.bookmarks.len() {
            return None;
        }
        let bookmark = self.bookmarks.remove(index);
        if let Some(article) = chapter.article_mut(bookmark.location) {
            article.tree.set_bookmark(bookmark.node_id, false);
        }
        self.current_page = self.current_page.min(self.max_page());
        debug!(node = bookmark.node_id, location = ?bookmark.location, "bookmark removed");
        Some(bookmark)
    }

    /// Removes the bookmark on a given node, if there is one
    pub fn remove_node(&mut self, chapter: &mut Chapter, location: ArticleLocation, node_id: NodeId) -> bool {
        match self.index_of(location, node_id) {
            Some(index) => self.remove(chapter, index).is_some(),
            None => false,
        }
    }

    /// Clears every bookmark of the chapter. Returns how many were removed.
    pub fn remove_all(&mut self, chapter: &mut Chapter) -> usize {
        let removed = self.bookmarks.len();
        for bookmark in self.bookmarks.drain(..) {
            if let Some(article) = chapter.article_mut(bookmark.location) {
                article.tree.set_bookmark(bookmark.node_id, false);
            }
        }
        self.current_page = 1;
        removed
    }

    /// Drops entries for nodes that were removed from the tree at `location`.
    pub fn purge(&mut self, location: ArticleLocation, removed: &[NodeId]) -> usize {
        let before = self.bookmarks.len();
        self.bookmarks
            .retain(|b| b.location != location || !removed.contains(&b.node_id));
        self.current_page = self.current_page.min(self.max_page());
        before - self.bookmarks.len()
    }

    pub fn index_of(&self, location: ArticleLocation, node_id: NodeId) -> Option<usize> {
        self.bookmarks
            .iter()
            .position(|b| b.location == location && b.node_id == node_id)
    }

    pub fn contains(&self, location: ArticleLocation, node_id: NodeId) -> bool {
        self.index_of(location, node_id).is_some()
    }

    pub fn get(&self, index: usize) -> Option<&Bookmark> {
        self.bookmarks.get(index)
    }

    pub fn bookmarks(&self) -> &[Bookmark] {
        &self.bookmarks
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    // Paging

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = self.current_page.min(self.max_page());
    }

    /// Number of pages, at least 1 even with no bookmarks
    pub fn max_page(&self) -> usize {
        self.bookmarks.len().div_ceil(self.page_size).max(1)
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Selects a page, clamped to `1..=max_page`
    pub fn set_page(&mut self, page: usize) -> usize {
        self.current_page = page.clamp(1, self.max_page());
        self.current_page
    }

    pub fn next_page(&mut self) -> usize {
        self.set_page(self.current_page + 1)
    }

    pub fn previous_page(&mut self) -> usize {
        self.set_page(self.current_page.saturating_sub(1))
    }

    /// Bookmarks on 1-based `page`; empty when the page is out of range
    pub fn page(&self, page: usize) -> &[Bookmark] {
        if page == 0 {
            return &[];
        }
        let start = (page - 1) * self.page_size;
        if start >= self.bookmarks.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.bookmarks.len());
        &self.bookmarks[start..end]
    }

    /// Index in the full list of the first bookmark on `page`
    pub fn page_offset(&self, page: usize) -> usize {
        page.saturating_sub(1) * self.page_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ROOT_NODE_ID;
    use crate::models::workbook::Article;

    fn chapter_with_game() -> (Chapter, Vec<NodeId>) {
        let mut chapter = Chapter::new("Test");
        let tree = &mut chapter.study.tree;
        let mut ids = Vec::new();
        let mut parent = ROOT_NODE_ID;
        for san in ["e4", "e5", "Nf3", "Nc6", "Bb5"] {
            parent = tree.add_move(parent, san).unwrap();
            ids.push(parent);
        }
        let mut game = Article::new(ContentType::ModelGame);
        let d4 = game.tree.add_move(ROOT_NODE_ID, "d4").unwrap();
        game.tree.set_bookmark(d4, true);
        chapter.model_games.push(game);
        (chapter, ids)
    }

    #[test]
    fn test_build_list_and_sort() {
        let (mut chapter, ids) = chapter_with_game();
        chapter.study.tree.set_bookmark(ids[4], true);
        chapter.study.tree.set_bookmark(ids[1], true);

        let mut registry = BookmarkRegistry::default();
        registry.build_list(&chapter);
        let keys: Vec<(u32, PieceColor)> = registry
            .bookmarks()
            .iter()
            .map(|b| (b.move_number, b.color))
            .collect();
        // e5 (1, White to move), d4 (1, Black to move), Bb5 (3, Black to move)
        assert_eq!(
            keys,
            vec![(1, PieceColor::White), (1, PieceColor::Black), (3, PieceColor::Black)]
        );
        assert_eq!(registry.get(1).unwrap().location, ArticleLocation::model_game(0));
    }

    #[test]
    fn test_add_and_remove_keep_flags_in_sync() {
        let (mut chapter, ids) = chapter_with_game();
        let mut registry = BookmarkRegistry::default();
        registry.build_list(&chapter);
        assert_eq!(registry.len(), 1);

        assert!(registry.add(&mut chapter, ArticleLocation::study(), ids[2]));
        assert!(!registry.add(&mut chapter, ArticleLocation::study(), ids[2]));
        assert!(chapter.study.tree.get(ids[2]).unwrap().is_bookmark());
        assert_eq!(registry.len(), 2);

        let index = registry.index_of(ArticleLocation::study(), ids[2]).unwrap();
        let removed = registry.remove(&mut chapter, index).unwrap();
        assert_eq!(removed.node_id, ids[2]);
        assert!(!chapter.study.tree.get(ids[2]).unwrap().is_bookmark());
        assert!(registry.remove(&mut chapter, 5).is_none());
    }

    #[test]
    fn test_remove_all() {
        let (mut chapter, ids) = chapter_with_game();
        chapter.study.tree.set_bookmark(ids[0], true);
        let mut registry = BookmarkRegistry::default();
        registry.build_list(&chapter);
        assert_eq!(registry.remove_all(&mut chapter), 2);
        assert!(registry.is_empty());
        assert!(!chapter.study.tree.has_bookmarks());
        assert!(!chapter.model_games[0].tree.has_bookmarks());
    }

    #[test]
    fn test_purge() {
        let (mut chapter, ids) = chapter_with_game();
        let mut registry = BookmarkRegistry::default();
        registry.add(&mut chapter, ArticleLocation::study(), ids[3]);
        registry.build_list(&chapter);
        assert_eq!(registry.purge(ArticleLocation::study(), &[ids[3], ids[4]]), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_paging() {
        let mut registry = BookmarkRegistry::new(9);
        assert_eq!(registry.max_page(), 1);
        assert!(registry.page(1).is_empty());

        let node = TreeNode::root(shakmaty::Chess::default());
        for _ in 0..9 {
            registry.bookmarks.push(Bookmark::new(ArticleLocation::study(), &node));
        }
        assert_eq!(registry.max_page(), 1);
        registry.bookmarks.push(Bookmark::new(ArticleLocation::study(), &node));
        assert_eq!(registry.max_page(), 2);
        assert_eq!(registry.page(1).len(), 9);
        assert_eq!(registry.page(2).len(), 1);
        assert!(registry.page(3).is_empty());
        assert_eq!(registry.set_page(7), 2);
        assert_eq!(registry.previous_page(), 1);
        assert_eq!(registry.previous_page(), 1);
        assert_eq!(registry.page_offset(2), 9);
    }
}
