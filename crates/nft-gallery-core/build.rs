fn main() {
    // The template store is embedded with `include_dir!`.
    println!("cargo:rerun-if-changed=templates");
}
