pub mod home;
pub mod image_viewer;
pub mod input_bar;
pub mod message_bubble;
pub mod message_list;
