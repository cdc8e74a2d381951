// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with **some** *content* and a [link](/view/1).\n\n- Bullet point\n- Another item\n\n1. First\n2. Second\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n---\n\n";
    base.repeat(size)
}

#[allow(dead_code)]
pub fn generate_adversarial_content(size: usize) -> String {
    let mut content = String::new();
    content.push_str(&"*".repeat(size));
    content.push('\n');
    content.push_str(&"**a*_~`".repeat(size / 8));
    content.push('\n');
    content.push_str(&"[![".repeat(size / 3));
    content.push_str(&"](".repeat(size / 2));
    content
}
