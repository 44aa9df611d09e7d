//! Per-frame pipeline
//!
//! Owns the scene and everything derived from it. A frame is:
//! mutate the tree, [`Frame::prepare`] the render list, let the backend
//! draw it, then feed input through [`Frame::handle_input`].
//!
//! Hits decode against the render order that was current when the
//! picking image was read back, not whatever a later `prepare` produced.
//! The backend must draw the most recent render list before its redraw
//! version changes.

use fos_input::{Clipboard, EventSink, InputEvent, InputState, MemoryClipboard};
use fos_paint::{
    CollectStats, Command, CommandProvider, Extent, Hit, PickingBuffer, PickingError,
    PickingSource, RenderList,
};
use fos_scene::{Epoch, MutationRecord, NodeId, SceneTree};

use crate::Config;

/// Scene plus render and input state
#[derive(Debug)]
pub struct Frame<C> {
    config: Config,
    tree: SceneTree,
    render_list: RenderList<C>,
    picking: PickingBuffer,
    input: InputState,
    root: Option<NodeId>,
    /// Render order and epoch behind the current picking image
    picked: Vec<NodeId>,
    picked_epoch: Option<Epoch>,
}

impl<C: Command> Frame<C> {
    pub fn new(config: Config) -> Self {
        Self::with_clipboard(config, Box::new(MemoryClipboard::new()))
    }

    pub fn with_clipboard(config: Config, clipboard: Box<dyn Clipboard>) -> Self {
        let input = InputState::with_clipboard(config.input.clone(), clipboard);
        Self {
            config,
            tree: SceneTree::new(),
            render_list: RenderList::new(),
            picking: PickingBuffer::new(),
            input,
            root: None,
            picked: Vec::new(),
            picked_epoch: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn set_config(&mut self, config: Config) {
        self.input.set_config(config.input.clone());
        if config.collect != self.config.collect {
            self.render_list.invalidate();
        }
        self.config = config;
    }

    #[inline]
    pub fn tree(&self) -> &SceneTree {
        &self.tree
    }

    #[inline]
    pub fn tree_mut(&mut self) -> &mut SceneTree {
        &mut self.tree
    }

    #[inline]
    pub fn render_list(&self) -> &RenderList<C> {
        &self.render_list
    }

    #[inline]
    pub fn picking(&self) -> &PickingBuffer {
        &self.picking
    }

    #[inline]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    #[inline]
    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    /// Root collected by the last [`Frame::prepare`]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Structural changes since the last drain
    pub fn drain_mutations(&mut self) -> Vec<MutationRecord> {
        self.tree.drain_mutations()
    }

    /// Collect the render list for the tree under `root` at the current
    /// scene epoch
    pub fn prepare<P>(&mut self, root: NodeId, provider: &P) -> CollectStats
    where
        P: CommandProvider<C> + ?Sized,
    {
        let epoch = self.tree.epoch();
        let force = self.config.collect.force_rebuild;
        let stats = self
            .render_list
            .collect(&mut self.tree, root, epoch, provider, force);
        if self.root != Some(root) {
            tracing::debug!(?root, "frame root changed");
        }
        self.root = Some(root);
        stats
    }

    /// Backend recreated its picking image
    pub fn on_recreated(&mut self, extent: Extent) {
        self.picking.on_recreated(extent);
    }

    /// Read back the picking image if it was redrawn
    pub fn refresh_picking<S>(&mut self, source: &mut S) -> Result<bool, PickingError>
    where
        S: PickingSource + ?Sized,
    {
        if !self.config.picking {
            return Ok(false);
        }
        let copied = self.picking.refresh(source)?;
        if copied {
            self.picked.clear();
            self.picked.extend_from_slice(self.render_list.nodes());
            self.picked_epoch = self.render_list.epoch();
            tracing::debug!(epoch = ?self.picked_epoch, nodes = self.picked.len(), "picking image bound to render order");
        }
        Ok(copied)
    }

    /// Collection epoch the current picking image decodes against
    pub fn picked_epoch(&self) -> Option<Epoch> {
        self.picked_epoch
    }

    /// Node under `(x, y)` as of the last readback
    pub fn hit_test(&self, x: f32, y: f32) -> Option<Hit> {
        if !self.config.picking {
            return None;
        }
        self.picking.hit_test(x, y, &self.picked)
    }

    /// Dispatch one platform event. Refreshes picking first; a failed
    /// readback falls back to the previous image.
    ///
    /// Returns the hit the event was resolved against.
    pub fn handle_input<S>(
        &mut self,
        event: &InputEvent,
        source: &mut S,
        sink: &mut dyn EventSink,
    ) -> Option<Hit>
    where
        S: PickingSource + ?Sized,
    {
        let hit = match event.position() {
            Some((x, y)) => {
                // Failure is logged by the buffer; the stale image still answers
                let _ = self.refresh_picking(source);
                self.hit_test(x, y)
            }
            None => None,
        };
        tracing::trace!(?event, ?hit, "input");
        self.input.handle(&self.tree, hit, event, sink);
        hit
    }
}
