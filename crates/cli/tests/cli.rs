use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

const ARTICLE: &str = r"\documentclass{article}
\begin{document}
\section{Intro}\label{sec:intro}
Some text with \emph{markup}.
\begin{figure}
  \includegraphics{plot.png}
  \label{fig:plot}
\end{figure}
\subsection{Detail}
\end{document}
";

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn prints_feature_lines_of_main_tex_by_default() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "main.tex", ARTICLE);

    let mut cmd = cargo_bin_cmd!("texskel");
    cmd.current_dir(dir.path());

    cmd.assert().success().stdout(
        predicate::str::starts_with("0 \\documentclass{article}\n1 \\begin{document}\n")
            .and(predicate::str::contains("2 \\section{Intro}\\label{sec:intro}\n"))
            .and(predicate::str::contains("emph").not()),
    );
}

#[test]
fn outline_format_nests_sections() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "article.tex", ARTICLE);

    let mut cmd = cargo_bin_cmd!("texskel");
    cmd.arg(&path).arg("--format").arg("outline");

    cmd.assert().success().stdout(
        predicate::str::contains("<h1 id=\"sec-intro\" data-depth=\"1\"")
            .and(predicate::str::contains("includegraphics: plot.png"))
            .and(predicate::str::contains("<h2 data-depth=\"2\"")),
    );
}

#[test]
fn mismatch_fails_with_line_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(
        dir.path(),
        "broken.tex",
        "\\begin{figure}\n\\label{x}\n\\end{table}\n",
    );

    let mut cmd = cargo_bin_cmd!("texskel");
    cmd.arg(&path);

    cmd.assert().code(1).stderr(
        predicate::str::contains("Begin/end mismatch")
            .and(predicate::str::contains("3 | \\end{table}")),
    );
}

#[test]
fn keep_going_reports_every_document() {
    let dir = tempfile::tempdir().unwrap();
    let broken = write(dir.path(), "broken.tex", "\\end{figure}\n");
    let good = write(dir.path(), "good.tex", "\\section{A}\n");

    let mut cmd = cargo_bin_cmd!("texskel");
    cmd.arg(&broken).arg(&good).arg("--keep-going").arg("--jobs").arg("2");

    cmd.assert()
        .code(1)
        .stdout(predicate::str::contains("good.tex <==\n0 \\section{A}"))
        .stderr(predicate::str::contains("Unbalanced end at line 1"));
}

#[test]
fn custom_vocabulary_adds_chapters() {
    let dir = tempfile::tempdir().unwrap();
    let vocabulary = write(
        dir.path(),
        "book.yaml",
        "level_keys:\n  chapter: 0\n  section: 1\n",
    );
    let path = write(dir.path(), "book.tex", "\\chapter{One}\n\\section{A}\n");

    let mut cmd = cargo_bin_cmd!("texskel");
    cmd.arg(&path).arg("--vocabulary").arg(&vocabulary).arg("--format").arg("tsv");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("1\tsection\t\tA\t\t0 1\t\t1\t"));
}

#[test]
fn invalid_vocabulary_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let vocabulary = write(dir.path(), "bad.yaml", "begin_key: open\n");

    let mut cmd = cargo_bin_cmd!("texskel");
    cmd.arg("--vocabulary").arg(&vocabulary).arg("--print-vocabulary");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load vocabulary"));
}

#[test]
fn print_vocabulary_dumps_defaults() {
    let mut cmd = cargo_bin_cmd!("texskel");
    cmd.arg("--print-vocabulary");

    cmd.assert().success().stdout(
        predicate::str::contains("subsubsection: 3")
            .and(predicate::str::contains("root_environment: document")),
    );
}

#[test]
fn page_format_fills_template_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "article.tex", ARTICLE);
    let template = write(
        dir.path(),
        "page.html",
        "<body><nav>{{tree}}</nav><section>{{table}}</section>{{raw}}</body>\n",
    );

    let mut cmd = cargo_bin_cmd!("texskel");
    cmd.arg(&path)
        .arg("--format")
        .arg("page")
        .arg("--template")
        .arg(&template);

    cmd.assert().success().stdout(
        predicate::str::starts_with("<body><nav><div class=\"outline\">")
            .and(predicate::str::contains("<section><table class=\"feature-table\">"))
            .and(predicate::str::contains("<pre class=\"source\">\\documentclass{article}"))
            .and(predicate::str::contains("{{").not()),
    );
}

#[test]
fn json_and_table_formats() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "article.tex", ARTICLE);

    let mut json = cargo_bin_cmd!("texskel");
    json.arg(&path).arg("--format").arg("json");
    json.assert().success().stdout(
        predicate::str::starts_with("{")
            .and(predicate::str::contains("\"records\""))
            .and(predicate::str::contains("\"expand_to\": 7")),
    );

    let mut table = cargo_bin_cmd!("texskel");
    table.arg(&path).arg("--format").arg("table");
    table.assert().success().stdout(
        predicate::str::starts_with("<table class=\"feature-table\">")
            .and(predicate::str::contains("<tr data-record=\"9\">")),
    );
}
