//! Render list collection
//!
//! Index assignment and command emission share one composed walk, so
//! the index rasterized into the picking image is always the position of
//! the node in [`RenderList::nodes`].

use fos_scene::{ComposedWalker, Composition, Epoch, NodeId, SceneTree};

use crate::command::{Command, CommandEntry, CommandProvider};
use crate::picking::{MAX_INDEXED_NODES, encode_pick_id};

/// Statistics for one collection call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// False when the cached list was still current
    pub rebuilt: bool,
    pub nodes: usize,
    pub commands: usize,
    /// Invisible subtrees skipped
    pub pruned: usize,
    /// Visible nodes past the picking index capacity
    pub unindexed: usize,
}

/// Flat per-frame render state
#[derive(Debug)]
pub struct RenderList<C> {
    nodes: Vec<NodeId>,
    entries: Vec<CommandEntry<C>>,
    scratch: Vec<C>,
    root: Option<NodeId>,
    epoch: Option<Epoch>,
}

impl<C> Default for RenderList<C> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            entries: Vec::new(),
            scratch: Vec::new(),
            root: None,
            epoch: None,
        }
    }
}

impl<C: Command> RenderList<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nodes in render-index order
    #[inline]
    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    /// Node with render index `index`
    pub fn node(&self, index: u32) -> Option<NodeId> {
        self.nodes.get(index as usize).copied()
    }

    /// Command entries in composed order
    #[inline]
    pub fn entries(&self) -> &[CommandEntry<C>] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Epoch of the last collection
    #[inline]
    pub fn epoch(&self) -> Option<Epoch> {
        self.epoch
    }

    /// Force the next collection to rebuild
    pub fn invalidate(&mut self) {
        self.epoch = None;
    }

    /// Entries in draw order: by z-index, composed order within a layer
    pub fn paint_order(&self) -> Vec<&CommandEntry<C>> {
        let mut ordered: Vec<&CommandEntry<C>> = self.entries.iter().collect();
        ordered.sort_by_key(|e| e.command.z_index());
        ordered
    }

    /// Walk the composed tree under `root`, assigning render indices to
    /// visible nodes and gathering their commands.
    ///
    /// Skipped when `epoch` and `root` match the previous call, unless
    /// `force` is set.
    pub fn collect<P>(
        &mut self,
        tree: &mut SceneTree,
        root: NodeId,
        epoch: Epoch,
        provider: &P,
        force: bool,
    ) -> CollectStats
    where
        P: CommandProvider<C> + ?Sized,
    {
        if !force && self.epoch == Some(epoch) && self.root == Some(root) {
            return CollectStats {
                rebuilt: false,
                nodes: self.nodes.len(),
                commands: self.entries.len(),
                ..Default::default()
            };
        }

        // Indices from the previous frame must not outlive it
        for &id in &self.nodes {
            tree.set_render_index(id, None);
        }
        self.entries.clear();

        let mut stats = CollectStats {
            rebuilt: true,
            ..Default::default()
        };
        let mut count: usize = 0;
        let mut walker = ComposedWalker::new(root, Composition::COMPOSED);
        let mut next = walker.move_next(tree);

        while let Some(id) = next {
            let Some(node) = tree.get(id) else {
                next = walker.move_next(tree);
                continue;
            };
            if !node.is_visible() {
                stats.pruned += 1;
                next = walker.skip_to_next_sibling(tree);
                continue;
            }
            let transform = node.cached_transform();

            let index = if (count as u32) < MAX_INDEXED_NODES {
                let index = count as u32;
                if count < self.nodes.len() {
                    self.nodes[count] = id;
                } else {
                    self.nodes.push(id);
                }
                count += 1;
                tree.set_render_index(id, Some(index));
                Some(index)
            } else {
                if stats.unindexed == 0 {
                    tracing::warn!(limit = MAX_INDEXED_NODES, "picking index capacity exceeded");
                }
                stats.unindexed += 1;
                None
            };

            self.scratch.clear();
            provider.commands(tree, id, &mut self.scratch);
            for command in self.scratch.drain(..) {
                let pick_id = index
                    .and_then(|i| encode_pick_id(i, command.virtual_child()))
                    .unwrap_or(0);
                self.entries.push(CommandEntry {
                    command,
                    transform,
                    node_index: index.unwrap_or(u32::MAX),
                    pick_id,
                });
            }

            next = walker.move_next(tree);
        }

        self.nodes.truncate(count);
        self.root = Some(root);
        self.epoch = Some(epoch);

        stats.nodes = count;
        stats.commands = self.entries.len();
        tracing::debug!(
            nodes = stats.nodes,
            commands = stats.commands,
            pruned = stats.pruned,
            epoch = epoch.value(),
            "render list collected"
        );
        stats
    }
}
