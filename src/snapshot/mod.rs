pub mod states;
pub mod layout;
pub mod header;
pub mod particles;
pub mod mesh;
pub mod amr;
pub mod supplementary;
pub mod reader;
pub mod trajectory;
