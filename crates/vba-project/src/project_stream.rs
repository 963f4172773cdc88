//! The `PROJECT` and `PROJECTwm` streams (MS-OVBA 2.3.1, 2.3.3).

use uuid::Uuid;

use crate::backend::DataEncryption;
use crate::crypto::project_key;
use crate::error::EncodingError;
use crate::field::{RecordWriter, encode_utf16le};
use crate::guid::format_guid;
use crate::module::ModuleKind;
use crate::project::VbaProject;

/// Class id of the MSForms designer, used for forms without a type GUID.
const FORMS_PACKAGE: Uuid = Uuid::from_u128(0xAC9F_2F90_E877_11CE_9F68_00AA_0057_4A4F);

/// `VersionCompatible32` value written by every current host.
const VERSION_COMPATIBLE: &str = "393222000";

const HOST_EXTENDER_INFO: &str =
    "[Host Extender Info]\r\n&H00000001={3832D640-CF90-11CF-8E43-00A0C911005A};VBE;&H00000000\r\n";

/// Render the `PROJECT` text stream in the project codepage.
///
/// # Errors
///
/// Fails when a name or description cannot be encoded in the codepage.
pub fn project_text(project: &VbaProject, encryption: &dyn DataEncryption) -> Result<Vec<u8>, EncodingError> {
    let info = project.info();
    let id = format_guid(&project.project_id());
    let key = project_key(&id);

    let mut lines = vec![format!("ID=\"{id}\"")];
    let mut packages: Vec<Uuid> = Vec::new();
    for module in project.modules() {
        let name = module.name();
        match module.kind() {
            ModuleKind::Standard => lines.push(format!("Module={name}")),
            ModuleKind::Class => lines.push(format!("Class={name}")),
            ModuleKind::Document { .. } => lines.push(format!("Document={name}/&H00000000")),
            ModuleKind::Form { type_guid, .. } => {
                let package = type_guid.unwrap_or(FORMS_PACKAGE);
                if !packages.contains(&package) {
                    lines.push(format!("Package={}", format_guid(&package)));
                    packages.push(package);
                }
                lines.push(format!("BaseClass={name}"));
            }
        }
    }

    if !info.help_file.is_empty() {
        lines.push(format!("HelpFile={}", quoted(&info.help_file)));
    }
    lines.push(format!("Name={}", quoted(&info.name)));
    lines.push(format!("HelpContextID=\"{}\"", info.help_context));
    if !info.doc_string.is_empty() {
        lines.push(format!("Description={}", quoted(&info.doc_string)));
    }
    lines.push(format!("VersionCompatible32=\"{VERSION_COMPATIBLE}\""));

    let protection = project.protection();
    let password = protection.password_hash().unwrap_or(&[0x00]);
    let encrypted = [
        ("CMG", encryption.encrypt(key, &protection.flags().to_le_bytes())),
        ("DPB", encryption.encrypt(key, password)),
        ("GC", encryption.encrypt(key, &[project.visibility().value()])),
    ];
    for (label, bytes) in encrypted {
        lines.push(format!("{label}=\"{}\"", hex::encode_upper(bytes)));
    }

    let mut text = lines.join("\r\n");
    text.push_str("\r\n\r\n");
    text.push_str(HOST_EXTENDER_INFO);

    info.codepage.encode("PROJECT", &text)
}

/// Wrap a property value in quotes, doubling any quote inside it.
fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Render `PROJECTwm`: each module name in the codepage then in UTF-16.
pub fn project_wm(project: &VbaProject) -> Result<Vec<u8>, EncodingError> {
    let codepage = project.codepage();
    let mut out = RecordWriter::new();
    for module in project.modules() {
        out.bytes(&codepage.encode("ModuleName", module.name())?)
            .int(0u8)
            .bytes(&encode_utf16le(module.name()))
            .int(0u16);
    }
    out.int(0u16);
    Ok(out.into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::OvbaEncryption;
    use crate::crypto::decrypt;
    use crate::module::Module;
    use crate::project::{ProjectBuilder, ProjectInfo};

    fn text(builder: &ProjectBuilder) -> String {
        let bytes = project_text(&builder.build(), &OvbaEncryption::default()).unwrap();
        String::from_utf8(bytes).unwrap()
    }

    fn line_value<'a>(text: &'a str, key: &str) -> &'a str {
        text.lines()
            .find_map(|line| line.strip_prefix(key))
            .unwrap()
            .trim_matches('"')
    }

    #[test]
    fn test_module_lines_follow_module_order() {
        let mut builder = ProjectBuilder::new();
        builder.add_module(Module::document("ThisWorkbook", "").unwrap()).unwrap();
        builder.add_module(Module::standard("Module1", "").unwrap()).unwrap();
        builder.add_module(Module::class("Widget", "").unwrap()).unwrap();
        builder.add_module(Module::form("UserForm1", "", Vec::new()).unwrap()).unwrap();
        builder.add_module(Module::form("UserForm2", "", Vec::new()).unwrap()).unwrap();
        let text = text(&builder);

        let lines: Vec<&str> = text.split("\r\n").collect();
        assert_eq!(lines[0], "ID=\"{00000000-0000-0000-0000-000000000000}\"");
        assert_eq!(
            &lines[1..7],
            [
                "Document=ThisWorkbook/&H00000000",
                "Module=Module1",
                "Class=Widget",
                "Package={AC9F2F90-E877-11CE-9F68-00AA00574A4F}",
                "BaseClass=UserForm1",
                "BaseClass=UserForm2",
            ]
        );
        assert_eq!(lines[7], "Name=\"VBAProject\"");
        assert!(text.ends_with(HOST_EXTENDER_INFO));
    }

    #[test]
    fn test_package_line_per_designer() {
        let designer = Uuid::from_u128(0x1111_2222_3333_4444_5555_6666_7777_8888);
        let mut builder = ProjectBuilder::new();
        builder.add_module(Module::form("UserForm1", "", Vec::new()).unwrap()).unwrap();
        builder
            .add_module(Module::form("Designer1", "", Vec::new()).unwrap().with_type_guid(designer))
            .unwrap();
        builder.add_module(Module::form("UserForm2", "", Vec::new()).unwrap()).unwrap();
        builder
            .add_module(Module::form("Designer2", "", Vec::new()).unwrap().with_type_guid(designer))
            .unwrap();
        let rendered = text(&builder);

        let lines: Vec<&str> = rendered.split("\r\n").collect();
        assert_eq!(
            &lines[1..7],
            [
                "Package={AC9F2F90-E877-11CE-9F68-00AA00574A4F}",
                "BaseClass=UserForm1",
                "Package={11112222-3333-4444-5555-666677778888}",
                "BaseClass=Designer1",
                "BaseClass=UserForm2",
                "BaseClass=Designer2",
            ]
        );
    }

    #[test]
    fn test_protection_lines_decrypt() {
        let mut builder = ProjectBuilder::with_info(ProjectInfo::default().with_name("Locked")).unwrap();
        builder.set_project_id("{917DED54-440B-4FD1-A5C1-74ACF261E600}").unwrap();
        builder.set_protection_flags(1).unwrap();
        builder.set_visibility_state(0).unwrap();
        let text = text(&builder);
        let key = project_key("{917DED54-440B-4FD1-A5C1-74ACF261E600}");

        let decode = |label: &str| decrypt(&hex::decode(line_value(&text, label)).unwrap()).unwrap();
        assert_eq!(decode("CMG="), (key, vec![1, 0, 0, 0]));
        assert_eq!(decode("DPB="), (key, vec![0x00]));
        assert_eq!(decode("GC="), (key, vec![0x00]));
        assert!(line_value(&text, "GC=").chars().all(|c| !c.is_ascii_lowercase()));
    }

    #[test]
    fn test_optional_lines() {
        let info = ProjectInfo::default()
            .with_doc_string("Monthly report")
            .with_help_file("report.chm", 5);
        let described = text(&ProjectBuilder::with_info(info).unwrap());
        assert_eq!(line_value(&described, "Description="), "Monthly report");
        assert_eq!(line_value(&described, "HelpFile="), "report.chm");
        assert_eq!(line_value(&described, "HelpContextID="), "5");

        let plain = text(&ProjectBuilder::new());
        assert!(!plain.contains("Description="));
        assert!(!plain.contains("HelpFile="));
    }

    #[test]
    fn test_embedded_quotes_doubled() {
        let info = ProjectInfo::default()
            .with_doc_string("The \"Q3\" report")
            .with_help_file("C:\\help\\\"odd\".chm", 0);
        let rendered = text(&ProjectBuilder::with_info(info).unwrap());
        assert!(rendered.contains("\r\nDescription=\"The \"\"Q3\"\" report\"\r\n"));
        assert!(rendered.contains("\r\nHelpFile=\"C:\\help\\\"\"odd\"\".chm\"\r\n"));
        assert!(rendered.contains("\r\nName=\"VBAProject\"\r\n"));
    }

    #[test]
    fn test_project_wm_layout() {
        let mut builder = ProjectBuilder::new();
        builder.add_module(Module::standard("M1", "").unwrap()).unwrap();
        let bytes = project_wm(&builder.build()).unwrap();
        assert_eq!(
            bytes,
            [b'M', b'1', 0x00, b'M', 0x00, b'1', 0x00, 0x00, 0x00, 0x00, 0x00]
        );
    }
}
