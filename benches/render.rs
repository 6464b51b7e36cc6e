use std::hint::black_box;

use quill::render::{render, render_html};

fn main() {
    divan::main();
}

fn sample_body(sections: usize) -> String {
    let mut body = String::from("# A long read\n\n");
    for section in 0..sections {
        body.push_str(&format!("## Part {section}\n"));
        body.push_str("Some opening words for this part of the article.\n\n");
        body.push_str("### Notes\n- first point\n- second point\n- third point\n\n");
    }
    body
}

#[divan::bench(args = [10, 100, 1000])]
fn blocks(bencher: divan::Bencher, sections: usize) {
    let body = sample_body(sections);
    bencher.bench(|| render(black_box(&body)));
}

#[divan::bench(args = [10, 100, 1000])]
fn html(bencher: divan::Bencher, sections: usize) {
    let body = sample_body(sections);
    bencher.bench(|| render_html(black_box(&body)));
}

