//! Cross-module tests for the bridge
//!
//! Unit tests live next to each module; these drive whole windows and apps
//! the way a renderer would.
