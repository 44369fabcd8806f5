//! Lookup function rendering
//!
//! Turns extracted entities into C functions mapping a value to its name.

use strgen_core::{Entity, EnumEntity, EnumLine, GeneratorConfig, MacroGroupEntity};

/// Settings that shape the generated functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Name of the macro-group lookup function
    pub macro_function: String,
    /// Fallback string of enum lookups
    pub enum_sentinel: String,
    /// Fallback string of the macro-group lookup
    pub macro_sentinel: String,
}

impl From<&GeneratorConfig> for RenderOptions {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            macro_function: config.macro_function.clone(),
            enum_sentinel: config.enum_sentinel.clone(),
            macro_sentinel: config.macro_sentinel.clone(),
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from(&GeneratorConfig::default())
    }
}

/// Render the lookup function for any entity
pub fn render_entity(entity: &Entity, options: &RenderOptions) -> String {
    match entity {
        Entity::Enum(e) => render_enum(e, &options.enum_sentinel),
        Entity::MacroGroup(g) => render_macro_group(g, &options.macro_function, &options.macro_sentinel),
    }
}

/// Designated-initializer table indexed by enumerator value
///
/// Directive lines of the enum body are copied into the table so that
/// entries exist under the same conditions as their enumerators.
pub fn render_enum(entity: &EnumEntity, sentinel: &str) -> String {
    let table: Vec<String> = entity
        .body
        .iter()
        .map(|line| match line {
            EnumLine::Member(name) => format!("        [{name}] = \"{name}\",", name = name),
            EnumLine::Directive(text) => text.clone(),
        })
        .collect();

    let mut out = String::new();
    out.push_str(&format!(
        "const char *{}_str( {} in )\n",
        entity.name, entity.prototype
    ));
    out.push_str("{\n");
    out.push_str("    const char * in_to_str[]=\n");
    out.push_str("    {\n");
    out.push_str(&table.join("\n"));
    out.push('\n');
    out.push_str("    };\n\n");
    out.push_str("    if( in > ( sizeof( in_to_str )/sizeof( in_to_str[0]) - 1 ) ||\n");
    out.push_str("        in_to_str[ in ] == NULL )\n");
    out.push_str("    {\n");
    out.push_str(&format!("        return \"{}\";\n", sentinel));
    out.push_str("    }\n");
    out.push_str("    return in_to_str[ in ];\n");
    out.push_str("}\n");
    out
}

/// Switch over the macro names, returning each name's lowercase suffix
pub fn render_macro_group(group: &MacroGroupEntity, function: &str, sentinel: &str) -> String {
    let cases: Vec<String> = group
        .definitions
        .iter()
        .map(|def| format!("\tcase {}:\n\t    return \"{}\";", def.name, group.label(def)))
        .collect();

    let mut out = String::new();
    out.push_str(&format!("const char *{}( uint16_t in )\n", function));
    out.push_str("{\n");
    out.push_str("    switch( in )\n");
    out.push_str("    {\n");
    out.push_str(&cases.join("\n"));
    out.push('\n');
    out.push_str("    };\n\n");
    out.push_str(&format!("    return \"{}\";\n", sentinel));
    out.push('}');
    out
}
