pub mod template_storage_memory;
