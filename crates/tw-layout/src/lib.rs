// ABOUTME: Tiling window layout engine.
// ABOUTME: Splits, deletes, resizes and balances windows in a tree that exactly tiles a frame.

mod balance;
mod delete;
mod error;
mod frame;
mod groups;
mod node;
mod policy;
mod snapshot;
mod solver;
mod split;
mod transaction;
mod validate;

pub use balance::BalanceReport;
pub use error::LayoutError;
pub use frame::Frame;
pub use node::{
    Axis, FixedSize, GroupId, Leaf, NormalSize, Rect, Side, Size, WindowId, WindowNode,
    WindowTree,
};
pub use policy::{DeletePolicy, SplitPolicy};
pub use snapshot::{LayoutSnapshot, WindowSnapshot};
pub use solver::{Ignore, Trail};
pub use split::Direction;
