use criterion::{black_box, criterion_group, criterion_main, Criterion};

use nbcritic_core::content::adapt_cell;
use nbcritic_core::notebook::Notebook;
use nbcritic_core::response::{parse_rater_response, RaterKind};

fn bench_parse_response(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_rater_response");

    let short = "<notebook_rater>\n  <thinking>fine</thinking>\n  <score>4</score>\n</notebook_rater>";

    let long_thinking = {
        let mut s = String::from("Some preamble the model added.\n<notebook_rater>\n<thinking>");
        for i in 0..200 {
            s.push_str(&format!("Observation {i}: the notebook does a thing. "));
        }
        s.push_str("</thinking>\n<score>3.5</score>\n</notebook_rater>\ntrailing chatter");
        s
    };

    group.bench_function("short", |b| {
        b.iter(|| parse_rater_response(black_box(short), RaterKind::Notebook))
    });

    group.bench_function("long_thinking", |b| {
        b.iter(|| parse_rater_response(black_box(&long_thinking), RaterKind::Notebook))
    });

    group.finish();
}

fn bench_adapt_cell(c: &mut Criterion) {
    let mut group = c.benchmark_group("adapt_cell");

    let notebook = Notebook::from_json_str(&generate_notebook_json(40)).unwrap();

    group.bench_function("markdown", |b| {
        b.iter(|| adapt_cell(black_box(&notebook.cells[0])))
    });

    group.bench_function("code_with_outputs", |b| {
        b.iter(|| adapt_cell(black_box(&notebook.cells[1])))
    });

    group.bench_function("40_cells", |b| {
        b.iter(|| {
            for cell in &notebook.cells {
                adapt_cell(black_box(cell));
            }
        })
    });

    group.finish();
}

fn generate_notebook_json(n: usize) -> String {
    let mut cells = Vec::new();
    for i in 0..n {
        if i % 2 == 0 {
            cells.push(serde_json::json!({
                "cell_type": "markdown",
                "source": [format!("## Section {i}\n"), "Some narrative text.".to_string()]
            }));
        } else {
            cells.push(serde_json::json!({
                "cell_type": "code",
                "source": [format!("result = compute_{i}(data)\n"), "print(result)".to_string()],
                "outputs": [
                    {"output_type": "stream", "text": ["processing...", "done"]},
                    {"output_type": "execute_result", "data": {"text/plain": ["42"]}}
                ]
            }));
        }
    }
    serde_json::json!({ "cells": cells }).to_string()
}

criterion_group!(benches, bench_parse_response, bench_adapt_cell);
criterion_main!(benches);
