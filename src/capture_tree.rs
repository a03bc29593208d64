//! Forced capture sequences as a tree, and the capture laws that prune it.
//!
//! The root is an anchor without a move. Each other node is one capture, and
//! its children are the captures the *same piece* can chain from its landing
//! cell. A continuation that goes straight back along the direction of the
//! capture that produced the node is never generated.
//!
//! - Law of quantity: keep only the sequences with the most captures.
//! - Law of quality: keep only the sequences with the highest capture value
//!   (queen = 2, peon = 1).
//!
//! The tree is rebuilt from scratch after every committed move.

use crate::board::{Board, CellId, Piece, Team};
use crate::constants::{PEON_CAPTURE_POINTS, QUEEN_CAPTURE_POINTS};
use crate::movegen::{Move, apply_move, piece_capture_moves, team_capture_moves};
use crate::rules::Rules;

/// One capture in a sequence, with the piece it removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CaptureStep {
    pub mv: Move,
    pub captured: Piece,
}

impl CaptureStep {
    /// Value of the captured piece for the law of quality.
    pub fn points(&self) -> usize {
        if self.captured.is_queen() {
            QUEEN_CAPTURE_POINTS
        } else {
            PEON_CAPTURE_POINTS
        }
    }
}

/// A node of the capture tree.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureNode {
    /// The capture leading to this node (`None` for the root).
    pub step: Option<CaptureStep>,
    /// Continuations, one per legal next capture.
    pub children: Vec<CaptureNode>,
}

impl CaptureNode {
    /// An empty anchor.
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(step: CaptureStep) -> Self {
        Self {
            step: Some(step),
            children: Vec::new(),
        }
    }

    pub fn mv(&self) -> Option<Move> {
        self.step.map(|s| s.mv)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of edges on the longest path down from this node.
    pub fn max_depth(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.max_depth() + 1)
            .max()
            .unwrap_or(0)
    }

    /// Best capture value reachable below this node, not counting its own step.
    pub fn max_points(&self) -> usize {
        self.children
            .iter()
            .map(|c| c.step_points() + c.max_points())
            .max()
            .unwrap_or(0)
    }

    fn step_points(&self) -> usize {
        self.step.map_or(0, |s| s.points())
    }

    /// Number of complete capture sequences through this node.
    pub fn leaf_count(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.children.iter().map(CaptureNode::leaf_count).sum()
    }

    /// Index of the child whose move goes from `source` to `destination`.
    pub fn find_child(&self, source: CellId, destination: CellId) -> Option<usize> {
        self.children.iter().position(|c| {
            c.mv()
                .is_some_and(|m| m.source == source && m.destination == destination)
        })
    }

    /// Follow a path of child indices.
    pub fn descend(&self, path: &[usize]) -> Option<&CaptureNode> {
        path.iter()
            .try_fold(self, |node, &idx| node.children.get(idx))
    }

    /// Every root-to-leaf sequence of moves below this node.
    pub fn sequences(&self) -> Vec<Vec<Move>> {
        let mut out = Vec::new();
        let mut current = Vec::new();
        for child in &self.children {
            child.collect_sequences(&mut current, &mut out);
        }
        out
    }

    fn collect_sequences(&self, current: &mut Vec<Move>, out: &mut Vec<Vec<Move>>) {
        if let Some(mv) = self.mv() {
            current.push(mv);
        }
        if self.is_leaf() {
            out.push(current.clone());
        }
        for child in &self.children {
            child.collect_sequences(current, out);
        }
        if self.step.is_some() {
            current.pop();
        }
    }
}

/// Build the capture tree for `team` and apply the capture laws enabled in
/// `rules` (quantity first, then quality).
pub fn build_capture_tree(board: &Board, rules: &Rules, team: Team) -> CaptureNode {
    let mut root = grow_capture_tree(board, rules, team);
    if rules.law_of_quantity {
        apply_law_of_quantity(&mut root);
    }
    if rules.law_of_quality {
        apply_law_of_quality(&mut root);
    }
    let sequences = if root.is_leaf() { 0 } else { root.leaf_count() };
    tracing::debug!(
        %team,
        first_captures = root.children.len(),
        sequences,
        depth = root.max_depth(),
        "built capture tree"
    );
    root
}

/// Build the full capture tree for `team` without any pruning.
pub fn grow_capture_tree(board: &Board, rules: &Rules, team: Team) -> CaptureNode {
    let mut root = CaptureNode::root();
    for mv in team_capture_moves(board, rules, team) {
        if let Some(child) = grow_continuation(board, rules, mv) {
            root.children.push(child);
        }
    }
    root
}

/// Node for capture `mv` played on `board`, with all of its continuations.
/// Every branch works on its own copy of the board.
fn grow_continuation(board: &Board, rules: &Rules, mv: Move) -> Option<CaptureNode> {
    let captured = board.get(mv.capture?)?;
    let mut after = *board;
    apply_move(&mut after, mv);

    let mut node = CaptureNode::new(CaptureStep { mv, captured });
    let geometry = after.geometry();
    let dir = mv.direction(geometry);

    for next in piece_capture_moves(&after, rules, mv.destination) {
        let next_dir = next.direction(geometry);
        if next_dir.x == -dir.x && next_dir.y == -dir.y {
            continue;
        }
        if let Some(child) = grow_continuation(&after, rules, next) {
            node.children.push(child);
        }
    }
    Some(node)
}

/// Remove every branch shorter than the longest capture sequence.
pub fn apply_law_of_quantity(tree: &mut CaptureNode) {
    let max_depth = tree.max_depth();
    prune_by_depth(tree, max_depth);
}

fn prune_by_depth(node: &mut CaptureNode, remaining: usize) {
    if remaining == 0 {
        return;
    }
    let before = node.children.len();
    node.children.retain(|c| c.max_depth() + 1 >= remaining);
    if node.children.len() != before {
        tracing::debug!(removed = before - node.children.len(), remaining, "law of quantity");
    }
    for child in &mut node.children {
        prune_by_depth(child, remaining - 1);
    }
}

/// Remove every branch whose capture value is below the best sequence.
pub fn apply_law_of_quality(tree: &mut CaptureNode) {
    let max_points = tree.max_points();
    prune_by_points(tree, max_points);
}

fn prune_by_points(node: &mut CaptureNode, remaining: usize) {
    let before = node.children.len();
    node.children
        .retain(|c| c.step_points() + c.max_points() >= remaining);
    if node.children.len() != before {
        tracing::debug!(removed = before - node.children.len(), remaining, "law of quality");
    }
    for child in &mut node.children {
        let budget = remaining.saturating_sub(child.step_points());
        prune_by_points(child, budget);
    }
}
