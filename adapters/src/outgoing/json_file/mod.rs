pub mod template_storage_file;
