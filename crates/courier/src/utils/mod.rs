pub mod typed_index;
