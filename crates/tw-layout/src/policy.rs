// ABOUTME: Per-window hooks that can take over splitting and deleting.
// ABOUTME: A hook returning None falls through to the built-in behavior.

use std::fmt;
use std::rc::Rc;

use crate::error::LayoutError;
use crate::frame::Frame;
use crate::node::WindowId;
use crate::split::Direction;

/// Replaces the default split for the window it is attached to.
pub trait SplitPolicy: fmt::Debug {
    /// Split `window` on behalf of the frame, or return None to let the
    /// default split run. Call `Frame::split_default` to split without
    /// consulting hooks again.
    fn split(
        &self,
        frame: &mut Frame,
        window: WindowId,
        size: Option<i32>,
        direction: Direction,
    ) -> Option<Result<WindowId, LayoutError>>;
}

/// Replaces the default delete for the window it is attached to.
pub trait DeletePolicy: fmt::Debug {
    fn delete(&self, frame: &mut Frame, window: WindowId) -> Option<Result<(), LayoutError>>;
}

impl Frame {
    pub fn set_split_policy(
        &mut self,
        window: WindowId,
        policy: Option<Rc<dyn SplitPolicy>>,
    ) -> Result<(), LayoutError> {
        self.live(window)?;
        match policy {
            Some(policy) => self.split_policies.insert(window, policy),
            None => self.split_policies.remove(&window),
        };
        Ok(())
    }

    pub fn set_delete_policy(
        &mut self,
        window: WindowId,
        policy: Option<Rc<dyn DeletePolicy>>,
    ) -> Result<(), LayoutError> {
        self.live(window)?;
        match policy {
            Some(policy) => self.delete_policies.insert(window, policy),
            None => self.delete_policies.remove(&window),
        };
        Ok(())
    }

    /// Drop a window from the arena along with any hooks attached to it.
    pub(crate) fn forget(&mut self, window: WindowId) {
        self.split_policies.remove(&window);
        self.delete_policies.remove(&window);
        self.tree.remove(window);
    }
}
