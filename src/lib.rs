/*!
 * # labelflow - care label text overflow engine
 *
 * A Rust library that decides how much text fits in a printed label region
 * and spreads the rest over a chain of child regions.
 *
 * ## Features
 *
 * - Line capacity and usable width of a region from geometry and typography
 * - Greedy, word-preserving line wrapping with manual line breaks
 * - Script classification for CJK and Arabic runs in multilingual text
 * - Overflow splitting into per-region chunks
 * - An async mother/child relationship manager with cascade deletion
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `layout`: Capacity, wrapping and splitting:
 *   - `layout::capacity`: Lines and width available in a region
 *   - `layout::wrap`: Greedy line wrapper
 *   - `layout::split`: Overflow splitter
 *   - `layout::engine`: One-call analysis
 * - `language_utils`: Script classification and segmentation
 * - `relationship`: Overflow chains and editor callbacks
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `errors`: Custom error types for the application
 */

// Global lints configuration
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod errors;
pub mod file_utils;
pub mod language_utils;
pub mod layout;
pub mod relationship;

// Re-export main types for easier usage
pub use app_config::Config;
pub use errors::{AppError, CollaboratorError, RelationshipError, StateError};
pub use language_utils::{classify_char, segment_by_script, ScriptSegment, ScriptTag};
pub use layout::{compute_capacity, split_for_overflow, wrap_text, Capacity, LayoutEngine, RegionConfig};
pub use relationship::{ChainOutcome, MotherCollaborator, RelationshipManager};
