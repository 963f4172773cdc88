use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use vba_cli::build::BuildReport;
use vba_project::{DirStream, ReferenceKind, ReferenceRecord, format_guid};

pub fn print_build_summary(report: &BuildReport) {
    println!("Project: {}", report.project_name);
    println!("Output: {}", report.output_dir.display());
    println!("References: {}", report.references);

    let mut modules = Table::new();
    modules.set_header(vec![
        header_cell("Module"),
        header_cell("Type"),
        header_cell("Stream"),
        header_cell("Lines"),
    ]);
    apply_table_style(&mut modules);
    align_column(&mut modules, 3, CellAlignment::Right);
    for module in &report.modules {
        modules.add_row(vec![
            Cell::new(&module.name).fg(Color::Blue),
            Cell::new(module.kind),
            dim_cell(&module.stream_name),
            Cell::new(module.source_lines),
        ]);
    }
    println!("{modules}");

    let mut files = Table::new();
    files.set_header(vec![header_cell("Stream"), header_cell("Bytes"), header_cell("Path")]);
    apply_table_style(&mut files);
    align_column(&mut files, 1, CellAlignment::Right);
    let mut total = 0usize;
    for file in &report.files {
        total += file.bytes;
        files.add_row(vec![
            Cell::new(&file.stream),
            Cell::new(file.bytes),
            dim_cell(file.path.display()),
        ]);
    }
    files.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(total).add_attribute(Attribute::Bold),
        Cell::new(""),
    ]);
    println!("{files}");
}

pub fn print_dir_stream(stream: &DirStream) {
    let info = &stream.info;
    let mut project = Table::new();
    project.set_header(vec![header_cell("Field"), header_cell("Value")]);
    apply_table_style(&mut project);
    let rows = [
        ("Name", info.name.clone()),
        ("SysKind", format!("{:?}", info.sys_kind)),
        (
            "CompatVersion",
            info.compat_version
                .map_or_else(|| "-".to_owned(), |version| format!("{version:#x}")),
        ),
        ("Lcid", format!("{:#06x}", info.lcid)),
        ("LcidInvoke", format!("{:#06x}", info.lcid_invoke)),
        ("CodePage", info.codepage.to_string()),
        ("DocString", info.doc_string.clone()),
        ("HelpFile", info.help_file.clone()),
        ("HelpContext", info.help_context.to_string()),
        (
            "Version",
            format!("{}.{}", info.version_major, info.version_minor),
        ),
        ("Constants", info.constants.clone()),
    ];
    for (field, value) in rows {
        project.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    println!("{project}");

    let mut references = Table::new();
    references.set_header(vec![
        header_cell("Reference"),
        header_cell("Kind"),
        header_cell("Target"),
    ]);
    apply_table_style(&mut references);
    for reference in &stream.references {
        references.add_row(vec![
            Cell::new(&reference.name).fg(Color::Blue),
            Cell::new(reference.tag()),
            dim_cell(reference_target(reference)),
        ]);
    }
    println!("{references}");

    let mut modules = Table::new();
    modules.set_header(vec![
        header_cell("Module"),
        header_cell("Stream"),
        header_cell("Type"),
        header_cell("Offset"),
        header_cell("Flags"),
    ]);
    apply_table_style(&mut modules);
    align_column(&mut modules, 3, CellAlignment::Right);
    for module in &stream.modules {
        let mut flags = Vec::new();
        if module.read_only {
            flags.push("read-only");
        }
        if module.private {
            flags.push("private");
        }
        modules.add_row(vec![
            Cell::new(&module.name).fg(Color::Blue),
            dim_cell(&module.stream_name),
            Cell::new(if module.procedural { "procedural" } else { "document" }),
            Cell::new(module.text_offset),
            Cell::new(flags.join(", ")),
        ]);
    }
    println!("{modules}");
}

fn reference_target(reference: &ReferenceRecord) -> String {
    match &reference.kind {
        ReferenceKind::Registered { libid } => libid.clone(),
        ReferenceKind::Project {
            absolute,
            major,
            minor,
            ..
        } => format!("{absolute} ({major}.{minor})"),
        ReferenceKind::Control(control) => format!(
            "{} [{}]",
            control.twiddled,
            format_guid(&control.original_typelib)
        ),
    }
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
