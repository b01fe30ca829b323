//! Armillary - the structural core of a visual class-diagram editor.
//!
//! The crate keeps a semantic model of classes, packages and relations
//! consistent with the graph canvas a host renderer draws, and makes every
//! structural edit undoable. Data flows one way:
//!
//! ```text
//! gesture -> InteractionBridge -> Command -> CommandExecutor -> Project
//!                                                                 |
//!             renderer <- GraphPatch <- diff <- GraphView <- projection
//! ```
//!
//! The [`project::Project`] facade owns the [`registry::Registry`] (entity
//! records) and the [`diagram::Diagram`] collection (placements with
//! geometry). Renderers never read the stores directly: they capture a
//! [`reconcile::GraphView`] projection, diff it against the previous one and
//! apply the resulting [`reconcile::GraphPatch`] incrementally.
//!
//! # Examples
//!
//! ```
//! use armillary::{
//!     config::EditorConfig,
//!     executor::CommandExecutor,
//!     interaction::InteractionBridge,
//!     project::Project,
//!     reconcile::{GraphView, diff},
//! };
//! use armillary::geometry::Point;
//! use armillary::meta::ClassKind;
//!
//! let mut project = Project::new();
//! let mut executor = CommandExecutor::default();
//! let bridge = InteractionBridge::new(EditorConfig::default());
//! let diagram = project.create_diagram("Main");
//!
//! // A palette drop becomes an undoable command.
//! let before = GraphView::default();
//! bridge
//!     .class_dropped(
//!         &mut project,
//!         &mut executor,
//!         diagram,
//!         "Order",
//!         ClassKind::Concrete,
//!         Point::new(100.0, 100.0),
//!         None,
//!     )
//!     .expect("drop failed");
//!
//! // The renderer applies the difference between two projections.
//! let shown = project.diagram(diagram).expect("diagram exists");
//! let after = GraphView::capture(shown, project.registry());
//! let patch = diff(&before, &after);
//! assert_eq!(patch.created_nodes().len(), 1);
//!
//! // Undo removes both the placement and the class it created.
//! executor.undo(&mut project);
//! assert_eq!(project.registry().classes().count(), 0);
//! ```

pub mod command;
pub mod config;
pub mod diagram;
pub mod executor;
pub mod interaction;
pub mod project;
pub mod reconcile;
pub mod registry;

mod error;

pub use armillary_core::{geometry, identifier, meta};

pub use error::{ArmillaryError, EntityKind};
