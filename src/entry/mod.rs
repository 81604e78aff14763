mod entry_point;


pub use entry_point::EntryPoint;
