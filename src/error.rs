use smol_str::SmolStr;
use thiserror::Error;

use crate::element::ElementId;
use crate::geometry::{Rect, Size};
use crate::queue::Phase;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("{phase} input out of range on {element:?}: {what} = {value}")]
    ArgumentOutOfRange {
        phase: Phase,
        element: ElementId,
        what: &'static str,
        value: f32,
    },

    #[error("{element:?} measured an unbounded desired size {size:?}")]
    UnboundedDesiredSize { element: ElementId, size: Size },

    #[error("{element:?} produced a clip rectangle with negative extent {clip:?}")]
    NegativeClip { element: ElementId, clip: Rect },

    #[error("element {0:?} does not exist")]
    UnknownElement(ElementId),

    #[error("name `{0}` is already registered in this view")]
    DuplicateName(SmolStr),

    #[error("no element named `{0}` in this view")]
    UnknownName(SmolStr),

    #[error("{0:?} already has a parent")]
    AlreadyParented(ElementId),

    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: ElementId, child: ElementId },

    #[error("the root element cannot be detached or destroyed")]
    RootRemoval,

    #[error("property `{0}` could not be resolved")]
    UnknownProperty(SmolStr),

    #[error("property `{0}` is not animatable")]
    NotAnimatable(SmolStr),

    #[error("{element:?} re-entered its own core computation during {phase}")]
    CoreInUse { element: ElementId, phase: Phase },

    #[error("{phase} pass exceeded {limit} iterations")]
    PassLimitExceeded { phase: Phase, limit: usize },

    #[error("the view owning this dispatcher was dropped")]
    DispatcherClosed,
}

pub type Result<T, E = LayoutError> = std::result::Result<T, E>;
