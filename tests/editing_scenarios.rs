//! End-to-end editing flows through `EditorSession`, plus tree-wide
//! properties checked over generated edit sequences.

use std::collections::HashSet;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use tasktree::editor::{Bounds, EditorSession, Key, KeyPress, PointerModifiers, TextField};
use tasktree::model::{TaskContainer, TaskNode, TaskRoot};
use tasktree::ops::ids::{IdSource, SequentialIds};
use tasktree::ops::tree_ops::{self, DropPosition, TaskPatch};

fn session(root: TaskRoot) -> EditorSession {
    EditorSession::new(root, Box::new(SequentialIds::new("n")))
}

fn task<'a>(root: &'a TaskRoot, id: &str) -> &'a TaskNode {
    tree_ops::find_task(root, id)
        .and_then(|found| found.node.as_task())
        .map(|t| t.as_ref())
        .unwrap_or_else(|| panic!("no task {}", id))
}

fn child_ids(children: &[Arc<TaskNode>]) -> Vec<&str> {
    children.iter().map(|c| c.id()).collect()
}

fn press(session: &mut EditorSession, id: &str, key: KeyPress) -> bool {
    let text = task(session.root(), id).text().to_string();
    session.key(id, &key, &TextField::new(&text, text.len()))
}

/// Task `id` spans rows 0..30 on screen
fn row(top: f64) -> Bounds {
    Bounds { top, height: 30.0 }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_enter_adds_an_empty_sibling_and_focuses_it() {
    let mut s = session(TaskRoot::new(vec![TaskNode::new("a", "first")]));
    assert!(press(&mut s, "a", KeyPress::plain(Key::Enter)));

    let children = s.root().children();
    assert_eq!(child_ids(children), vec!["a", "n1"]);
    assert_eq!(children[0].text(), "first");
    assert_eq!(children[1].text(), "");
    assert!(!children[1].has_children());
    assert_eq!(s.focused_id(), Some("n1"));
}

#[test]
fn test_tab_adds_an_empty_child_and_focuses_it() {
    let mut s = session(TaskRoot::new(vec![
        TaskNode::new("a", "plan"),
        TaskNode::new("b", "other"),
    ]));
    assert!(press(&mut s, "a", KeyPress::plain(Key::Tab)));

    let a = task(s.root(), "a");
    assert_eq!(a.text(), "plan");
    assert_eq!(child_ids(a.children()), vec!["n1"]);
    assert_eq!(a.children()[0].text(), "");
    assert_eq!(child_ids(s.root().children()), vec!["a", "b"]);
    assert_eq!(s.focused_id(), Some("n1"));
}

#[test]
fn test_backspace_on_empty_middle_sibling_removes_it() {
    let mut s = session(TaskRoot::new(vec![
        TaskNode::new("p", "parent")
            .with_child(TaskNode::new("a", "one"))
            .with_child(TaskNode::empty("b"))
            .with_child(TaskNode::new("c", "three")),
    ]));
    assert!(press(&mut s, "b", KeyPress::plain(Key::Backspace)));

    let p = task(s.root(), "p");
    assert_eq!(child_ids(p.children()), vec!["a", "c"]);
    assert_eq!(s.focused_id(), Some("a"));
}

#[test]
fn test_backspace_with_text_is_left_to_the_field() {
    let mut s = session(TaskRoot::new(vec![TaskNode::new("a", "x"), TaskNode::new("b", "y")]));
    let before = s.revision();
    assert!(!press(&mut s, "b", KeyPress::plain(Key::Backspace)));
    assert_eq!(s.revision(), before);
}

#[test]
fn test_leading_space_spawns_a_child_with_the_rest() {
    let mut s = session(TaskRoot::new(vec![TaskNode::new("c", "shopping")]));
    s.focus_task("c", false);
    s.text_change("c", " buy milk");

    let c = task(s.root(), "c");
    assert_eq!(c.text(), "shopping");
    assert_eq!(c.children().len(), 1);
    assert_eq!(c.children()[0].text(), "buy milk");
    assert_eq!(s.focused_id(), Some("n1"));
    let request = s.confirm_rendered(|id| id == "n1").unwrap();
    assert_eq!(request.id, "n1");
    assert!(request.cursor_to_end);
}

#[test]
fn test_dropping_into_own_subtree_changes_nothing() {
    let root = TaskRoot::new(vec![
        TaskNode::new("x", "outer").with_child(
            TaskNode::new("m", "middle").with_child(TaskNode::new("y", "inner")),
        ),
        TaskNode::new("z", "other"),
    ]);
    let mut s = session(root.clone());

    assert!(s.drag_start("x", PointerModifiers::default()));
    s.drag_over("y", row(60.0), 75.0);
    assert_eq!(s.drag().position(), Some(DropPosition::Child));
    assert!(!s.drop_on("y"));

    assert_eq!(s.root(), &root);
    assert!(s.root().shares_structure_with(&root));
    assert!(!s.drag().is_dragging());
}

#[test]
fn test_dropping_in_top_third_places_before_target() {
    let mut s = session(TaskRoot::new(vec![
        TaskNode::new("y", "target"),
        TaskNode::new("w", "between"),
        TaskNode::new("x", "dragged").with_completed(true),
    ]));

    assert!(s.drag_start("x", PointerModifiers::default()));
    s.drag_over("y", row(0.0), 5.0);
    assert!(s.drop_on("y"));

    assert_eq!(child_ids(s.root().children()), vec!["x", "y", "w"]);
    let x = task(s.root(), "x");
    assert_eq!(x.text(), "dragged");
    assert!(x.is_completed());
}

#[test]
fn test_ctrl_pointer_down_does_not_start_a_drag() {
    let mut s = session(TaskRoot::new(vec![TaskNode::new("a", "a"), TaskNode::new("b", "b")]));
    let pan = PointerModifiers {
        ctrl: true,
        meta: false,
    };
    assert!(!s.drag_start("a", pan));
    assert!(!s.drop_on("b"));
    assert_eq!(child_ids(s.root().children()), vec!["a", "b"]);
}

#[test]
fn test_keyboard_outdent_and_indent() {
    let mut s = session(TaskRoot::new(vec![
        TaskNode::new("p", "parent").with_child(TaskNode::new("c", "child")),
        TaskNode::new("q", "next"),
    ]));
    assert!(press(&mut s, "c", KeyPress::alt(Key::Left)));
    assert_eq!(child_ids(s.root().children()), vec!["p", "c", "q"]);
    assert!(!task(s.root(), "p").has_children());

    assert!(press(&mut s, "q", KeyPress::alt(Key::Right)));
    assert_eq!(child_ids(task(s.root(), "c").children()), vec!["q"]);
}

#[test]
fn test_stale_ids_are_no_ops() {
    let root = TaskRoot::new(vec![TaskNode::new("a", "a")]);
    let mut s = session(root.clone());
    s.text_change("gone", "text");
    s.add_child("gone");
    assert!(!s.toggle("gone"));
    assert!(!s.delete("gone"));
    assert!(!press_unknown(&mut s));
    assert_eq!(s.revision(), 0);
    assert!(s.root().shares_structure_with(&root));
}

fn press_unknown(s: &mut EditorSession) -> bool {
    s.key("gone", &KeyPress::plain(Key::Enter), &TextField::new("", 0))
}

// ============================================================================
// Properties
// ============================================================================

/// Hands out every id twice so collisions actually happen
struct StutteringIds {
    next: u64,
    repeat: bool,
}

impl IdSource for StutteringIds {
    fn next_id(&mut self) -> String {
        if !self.repeat {
            self.next += 1;
        }
        self.repeat = !self.repeat;
        format!("t{}", self.next)
    }
}

fn all_ids(root: &TaskRoot) -> Vec<String> {
    tree_ops::collect_ids(root)
        .into_iter()
        .map(str::to_string)
        .collect()
}

#[test]
fn test_ids_stay_unique_over_random_inserts() {
    let mut rng = StdRng::seed_from_u64(7);
    let mut s = EditorSession::new(
        TaskRoot::new(vec![TaskNode::new("t1", "seed")]),
        Box::new(StutteringIds {
            next: 0,
            repeat: false,
        }),
    );

    for _ in 0..300 {
        let ids = all_ids(s.root());
        let target = ids[rng.gen_range(0..ids.len())].clone();
        match rng.gen_range(0..4) {
            0 => {
                press(&mut s, &target, KeyPress::plain(Key::Enter));
            }
            1 => {
                press(&mut s, &target, KeyPress::plain(Key::Tab));
            }
            2 => s.text_change(&target, " spawned"),
            _ => s.add_top_level(),
        }
        let ids = all_ids(s.root());
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len(), "duplicate id after inserts: {:?}", ids);
    }
    assert!(tree_ops::duplicate_ids(s.root()).is_empty());
}

fn expected_completion(node: &TaskNode) -> bool {
    if node.children().is_empty() {
        node.completed_flag().unwrap_or(false)
    } else {
        node.children().iter().all(|c| expected_completion(c))
    }
}

#[test]
fn test_completion_is_derived_from_leaves() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut s = session(TaskRoot::new(vec![TaskNode::new("a", "a")]));
    for _ in 0..200 {
        let ids = all_ids(s.root());
        let target = ids[rng.gen_range(0..ids.len())].clone();
        match rng.gen_range(0..3) {
            0 => {
                s.add_child(&target);
            }
            1 => {
                s.toggle(&target);
            }
            _ => {
                s.delete(&target);
                if s.root().children().is_empty() {
                    s.add_top_level();
                }
            }
        }
        for t in tree_ops::collect_tasks(s.root()) {
            assert_eq!(t.is_completed(), expected_completion(t), "task {}", t.id());
        }
    }
}

#[test]
fn test_leaf_that_gains_a_child_drops_its_flag() {
    let mut s = session(TaskRoot::new(vec![TaskNode::new("a", "a").with_completed(true)]));
    s.add_child("a");
    let a = task(s.root(), "a");
    assert_eq!(a.completed_flag(), None);
    assert!(!a.is_completed());

    s.delete("n1");
    let a = task(s.root(), "a");
    assert_eq!(a.completed_flag(), Some(false));
}

#[test]
fn test_update_shares_untouched_branches() {
    let root = TaskRoot::new(vec![
        TaskNode::new("a", "a")
            .with_child(TaskNode::new("a1", "a1"))
            .with_child(TaskNode::new("a2", "a2").with_child(TaskNode::new("deep", "deep"))),
        TaskNode::new("b", "b").with_child(TaskNode::new("b1", "b1")),
    ]);
    let updated = tree_ops::update_task(&root, "deep", &TaskPatch::text("x"));

    assert_eq!(task(&updated, "deep").text(), "x");
    assert!(Arc::ptr_eq(&root.children()[1], &updated.children()[1]));
    let (old_a, new_a) = (&root.children()[0], &updated.children()[0]);
    assert!(!Arc::ptr_eq(old_a, new_a));
    assert!(Arc::ptr_eq(&old_a.children()[0], &new_a.children()[0]));
    assert!(!Arc::ptr_eq(&old_a.children()[1], &new_a.children()[1]));
    assert_eq!(task(&root, "deep").text(), "deep");
}

#[test]
fn test_no_task_can_move_under_its_own_descendants() {
    let root = TaskRoot::new(vec![
        TaskNode::new("a", "a").with_child(
            TaskNode::new("b", "b")
                .with_child(TaskNode::new("c", "c"))
                .with_child(TaskNode::new("d", "d").with_child(TaskNode::new("e", "e"))),
        ),
        TaskNode::new("f", "f"),
    ]);

    for ancestor in tree_ops::collect_tasks(&root) {
        let below: Vec<&str> = tree_ops::collect_ids(&root)
            .into_iter()
            .filter(|id| *id != ancestor.id() && tree_ops::is_descendant(ancestor, id))
            .collect();
        for target in below {
            for position in [DropPosition::Before, DropPosition::After, DropPosition::Child] {
                let mut s = session(root.clone());
                assert!(s.drag_start(ancestor.id(), PointerModifiers::default()));
                s.drag_over(target, row(0.0), match position {
                    DropPosition::Before => 1.0,
                    DropPosition::Child => 15.0,
                    DropPosition::After => 29.0,
                });
                assert!(!s.drop_on(target), "{} -> {}", ancestor.id(), target);
                assert!(s.root().shares_structure_with(&root));
            }
        }
    }
}

#[test]
fn test_root_stats_follow_top_level_tasks() {
    let mut s = session(TaskRoot::new(vec![
        TaskNode::new("a", "a"),
        TaskNode::new("b", "b").with_child(TaskNode::new("b1", "b1")),
    ]));
    s.toggle("a");
    s.toggle("b1");
    let stats = s.root().completion_stats();
    assert_eq!((stats.completed, stats.total), (2, 2));
}
