use chess_workbook::Config;
use chess_workbook::domain::{ContentType, NodeId, ROOT_NODE_ID, VariationTree};
use chess_workbook::models::{ArticleLocation, BookmarkRegistry, Chapter, Session, Workbook};
use chess_workbook::pgn::{Profile, build_tree_text, parse_game};

struct Open {
    tree: VariationTree,
    e5: NodeId,
    nf3: NodeId,
    bc4: NodeId,
}

fn open_game() -> Open {
    let mut tree = VariationTree::new(ContentType::Study);
    let e4 = tree.add_move(ROOT_NODE_ID, "e4").unwrap();
    let e5 = tree.add_move(e4, "e5").unwrap();
    let nf3 = tree.add_move(e5, "Nf3").unwrap();
    tree.add_move(nf3, "Nc6").unwrap();
    let bc4 = tree.add_move(e5, "Bc4").unwrap();
    tree.add_move(bc4, "Nc6").unwrap();
    Open { tree, e5, nf3, bc4 }
}

fn squash_spaces(text: &str) -> String {
    text.replace('(', " ( ")
        .replace(')', " ) ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn san_of(tree: &VariationTree, id: NodeId) -> &str {
    tree.get(id).and_then(|n| n.san.as_deref()).unwrap()
}

#[test]
fn test_variation_written_and_read_back() {
    let open = open_game();
    let text = build_tree_text(&open.tree, Profile::Native);
    assert_eq!(squash_spaces(&text), "1. e4 e5 2. Nf3 ( 2. Bc4 Nc6 ) 2... Nc6");

    let tree = parse_game(&format!("{} *", text), ContentType::Study).unwrap();
    let root = tree.root();
    assert_eq!(root.children().len(), 1);
    let e4 = root.children()[0];
    assert_eq!(san_of(&tree, e4), "e4");
    let e4_node = tree.get(e4).unwrap();
    assert_eq!(e4_node.children().len(), 1);
    let e5 = e4_node.children()[0];
    let forks = tree.get(e5).unwrap().children().to_vec();
    assert_eq!(forks.len(), 2);
    assert_eq!(san_of(&tree, forks[0]), "Nf3");
    assert_eq!(san_of(&tree, forks[1]), "Bc4");

    let nc6_main = tree.get(forks[0]).unwrap().children()[0];
    let nc6_side = tree.get(forks[1]).unwrap().children()[0];
    assert_eq!(san_of(&tree, nc6_main), "Nc6");
    assert_eq!(san_of(&tree, nc6_side), "Nc6");
    assert_ne!(nc6_main, nc6_side);
}

fn chapter_with(tree: VariationTree) -> Chapter {
    let mut chapter = Chapter::new("Open Games");
    chapter.study.tree = tree;
    chapter
}

#[test]
fn test_bookmark_added_then_removed() {
    let open = open_game();
    let nf3 = open.nf3;
    let mut chapter = chapter_with(open.tree);
    chapter.study.tree.set_bookmark(nf3, true);

    let mut registry = BookmarkRegistry::default();
    registry.build_list(&chapter);
    assert_eq!(registry.len(), 1);
    let bookmark = registry.get(0).unwrap();
    assert_eq!(bookmark.node_id, nf3);
    assert_eq!(bookmark.location, ArticleLocation::study());

    assert!(registry.remove(&mut chapter, 0).is_some());
    assert!(registry.is_empty());
    assert!(!chapter.study.tree.get(nf3).unwrap().is_bookmark());
}

#[test]
fn test_remove_tail_drops_both_forks_and_their_bookmarks() {
    let open = open_game();
    let (e5, nf3, bc4) = (open.e5, open.nf3, open.bc4);
    let mut chapter = chapter_with(open.tree);
    chapter.study.tree.set_bookmark(nf3, true);
    chapter.study.tree.set_bookmark(bc4, true);
    let mut workbook = Workbook::new("Test");
    workbook.add_chapter(chapter);

    let mut session = Session::new(workbook, Config::default());
    assert_eq!(session.bookmarks().len(), 2);

    let removed = session.remove_tail_after(ArticleLocation::study(), e5).unwrap();
    assert_eq!(removed.len(), 4);
    assert!(removed.contains(&nf3) && removed.contains(&bc4));
    assert!(session.bookmarks().is_empty());

    let tree = session.active_tree().unwrap();
    assert_eq!(tree.len(), 3);
    assert!(tree.get(e5).unwrap().children().is_empty());
}
