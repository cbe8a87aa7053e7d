//! Process spawning, output draining, and reaping for one host's child
//! (spec §4.2, §4.3, §4.5).

mod pipe;
mod reader;
mod reaper;
mod spawner;

pub use pipe::{ChildPipe, create_pipe};
pub use reader::{JoinAccumulator, LineAccumulator, drain_chunks, drain_join, drain_lines};
pub use reaper::{ReapResult, reap};
pub use spawner::{ChildReaders, SpawnedChild, spawn};
