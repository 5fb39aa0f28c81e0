//! ECS Components для entity сада
//!
//! Организация по доменам:
//! - spot: горшки (PlantSpot, DormantSpot)
//! - tool: инструменты (ToolSession, ToolHolder, ToolProbe, ToolKind, ToolTuning)
//! - hand: руки пациента (Hand, HandPose, SpotDetector)
//! - flower: сбор цветов (FlowerPick, FlowerKind)

pub mod spot;
pub mod tool;
pub mod hand;
pub mod flower;


// Re-exports для удобного импорта
pub use spot::*;
pub use tool::*;
pub use hand::*;
pub use flower::*;
