use std::process;

fn main() {
    match markdown_site_cli::run() {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("markdown-site error: {err:#}");
            process::exit(1);
        }
    }
}
