//! Output file template

use strgen_core::GeneratorConfig;

const LICENSE: &str = "\
/*
 *  Copyright The Mbed TLS Contributors
 *  SPDX-License-Identifier: Apache-2.0
 *
 *  Licensed under the Apache License, Version 2.0 (the \"License\"); you may
 *  not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *  http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an \"AS IS\" BASIS, WITHOUT
 *  WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */
";

/// Fixed wrapper around the generated functions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTemplate {
    /// File name shown in the `\file` doc comment
    pub file_name: String,
    /// Macro the whole body is conditional on
    pub guard_macro: String,
    /// Declarations header included before the functions
    pub companion_header: String,
}

impl From<&GeneratorConfig> for OutputTemplate {
    fn from(config: &GeneratorConfig) -> Self {
        Self {
            file_name: config.output_file.clone(),
            guard_macro: config.guard_macro.clone(),
            companion_header: config.companion_header.clone(),
        }
    }
}

impl OutputTemplate {
    /// Wrap `functions` in the generated-file boilerplate
    pub fn render(&self, functions: &str) -> String {
        let mut out = String::new();
        out.push_str("/* Automatically generated by strgen. DO NOT EDIT. */\n\n");
        out.push_str("/**\n");
        out.push_str(&format!(" * \\file {}\n", self.file_name));
        out.push_str(" *\n");
        out.push_str(" * \\brief Automatically generated helper functions for debugging\n");
        out.push_str(" */\n");
        out.push_str(LICENSE);
        out.push('\n');
        out.push_str("#include \"common.h\"\n\n");
        out.push_str(&format!("#if defined({})\n\n", self.guard_macro));
        out.push_str(&format!("#include \"{}\"\n\n", self.companion_header));
        out.push_str(functions);
        out.push_str("\n\n");
        out.push_str(&format!("#endif /* {} */\n", self.guard_macro));
        out.push_str("/* End of automatically generated file. */\n\n");
        out
    }
}
