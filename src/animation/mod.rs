mod clock;
mod pool;
mod storyboard;
mod time_function;

pub use clock::*;
pub use pool::*;
pub use storyboard::*;
pub use time_function::*;
