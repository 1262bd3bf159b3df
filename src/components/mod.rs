pub mod app;
pub mod item_modal;
pub mod layer_legend;
pub mod timeline_view;
pub mod zoom_controls;
