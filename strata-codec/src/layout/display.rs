use std::fmt::{Display, Formatter};

use strata_dtype::{PhysicalType, Repetition, ScalarType};

use crate::{FieldKind, FieldLayout, FieldNode, LIST_WRAPPER, MAP_WRAPPER};

impl Display for FieldLayout {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "message {} {{", self.group())?;
        for field in self.fields() {
            write_node(f, field, 1)?;
        }
        write!(f, "}}")
    }
}

impl Display for FieldNode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_node(f, self, 0)
    }
}

fn write_node(f: &mut Formatter<'_>, node: &FieldNode, depth: usize) -> std::fmt::Result {
    let indent = depth * 2;
    match node.kind() {
        FieldKind::Primitive(field) => {
            write!(
                f,
                "{:indent$}{} {} {}",
                "",
                node.repetition(),
                field.physical(),
                node.name()
            )?;
            if field.physical() == PhysicalType::Binary && field.logical() == Some(ScalarType::Utf8)
            {
                write!(f, " (UTF8)")?;
            }
            writeln!(f, ";")
        }
        FieldKind::List(element) => {
            writeln!(
                f,
                "{:indent$}{} group {} (LIST) {{",
                "",
                node.repetition(),
                node.name()
            )?;
            write_wrapper(f, LIST_WRAPPER, indent + 2)?;
            write_node(f, element, depth + 2)?;
            writeln!(f, "{:w$}}}", "", w = indent + 2)?;
            writeln!(f, "{:indent$}}}", "")
        }
        FieldKind::Map(key, value) => {
            writeln!(
                f,
                "{:indent$}{} group {} (MAP) {{",
                "",
                node.repetition(),
                node.name()
            )?;
            write_wrapper(f, MAP_WRAPPER, indent + 2)?;
            write_node(f, key, depth + 2)?;
            write_node(f, value, depth + 2)?;
            writeln!(f, "{:w$}}}", "", w = indent + 2)?;
            writeln!(f, "{:indent$}}}", "")
        }
        FieldKind::Composite(composite) => match composite.leaves() {
            [leaf] => write_node(f, leaf, depth),
            leaves => {
                writeln!(
                    f,
                    "{:indent$}{} group {} ({}) {{",
                    "",
                    node.repetition(),
                    node.name(),
                    composite.converter().id()
                )?;
                for leaf in leaves {
                    write_node(f, leaf, depth + 1)?;
                }
                writeln!(f, "{:indent$}}}", "")
            }
        },
    }
}

fn write_wrapper(f: &mut Formatter<'_>, wrapper: &str, indent: usize) -> std::fmt::Result {
    writeln!(
        f,
        "{:indent$}{} group {} {{",
        "",
        Repetition::Repeated,
        wrapper
    )
}

#[cfg(test)]
mod tests {
    use strata_dtype::{GroupSchema, LogicalType};

    use crate::SchemaResolver;

    #[test]
    fn renders_message_type() {
        let schema = GroupSchema::entity("Person", LogicalType::UTF8)
            .with_property("age", LogicalType::I32)
            .with_property("tags", LogicalType::list(LogicalType::UTF8))
            .with_property(
                "scores",
                LogicalType::map(LogicalType::UTF8, LogicalType::I64),
            );
        let layout = SchemaResolver::default().resolve(&schema).unwrap();

        assert_eq!(
            layout.to_string(),
            "message Person {
  required binary vertex (UTF8);
  optional int32 age;
  optional group tags (LIST) {
    repeated group list {
      optional binary element (UTF8);
    }
  }
  optional group scores (MAP) {
    repeated group key_value {
      required binary key (UTF8);
      optional int64 value;
    }
  }
}"
        );
    }
}
