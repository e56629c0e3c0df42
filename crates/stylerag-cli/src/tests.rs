//! Snapshot tests for CLI rendering

#[cfg(test)]
mod snapshot_tests {
    use crate::ui::read_piped_line;
    use crate::{format_diagnostics, format_source_line};
    use insta::assert_snapshot;
    use std::io::{self, Cursor};
    use stylerag_core::{Citation, Diagnostics};

    #[test]
    fn test_source_line() {
        let citation = Citation {
            document: Some("cppguide".to_string()),
            chapter: Some("Naming".to_string()),
            section: Some("Constant Names".to_string()),
            link: Some("https://google.github.io/styleguide/cppguide.html#Constant_Names".to_string()),
        };

        assert_snapshot!(
            format_source_line(&citation),
            @"• cppguide > Naming > [Constant Names](https://google.github.io/styleguide/cppguide.html#Constant_Names)"
        );
    }

    #[test]
    fn test_source_line_without_link() {
        let citation = Citation {
            document: Some("pep8".to_string()),
            chapter: Some("Code Lay-out".to_string()),
            section: Some("Maximum Line Length".to_string()),
            link: None,
        };

        assert_eq!(
            format_source_line(&citation),
            "• pep8 > Code Lay-out > Maximum Line Length"
        );
    }

    #[test]
    fn test_diagnostics_panel() {
        let diagnostics = Diagnostics {
            index_name: "codestyle-semantic-search".to_string(),
            vector_count: 2317,
            dimension: 1536,
            embedding_model: "text-embedding-ada-002".to_string(),
            generation_model: "gpt-3.5-turbo".to_string(),
        };

        assert_snapshot!(format_diagnostics(&diagnostics), @r###"
        Index name: codestyle-semantic-search
        Index size: 2317
        Embedding model: text-embedding-ada-002
        Vector dimensionality: 1536
        Generation model: gpt-3.5-turbo
        "###);
    }

    #[test]
    fn test_piped_input_ends_at_eof() {
        let mut history = Vec::new();
        let mut reader = Cursor::new("How to name a constant?\n\n");

        assert_eq!(
            read_piped_line(&mut reader, &mut history).unwrap().as_deref(),
            Some("How to name a constant?")
        );
        // A blank line is still input, only end of input stops the loop
        assert_eq!(read_piped_line(&mut reader, &mut history).unwrap().as_deref(), Some(""));
        assert_eq!(read_piped_line(&mut reader, &mut history).unwrap(), None);
        assert_eq!(history, vec!["How to name a constant?".to_string()]);
    }

    #[test]
    fn test_empty_stdin_yields_nothing() {
        let mut history = Vec::new();
        assert!(read_piped_line(io::empty(), &mut history).unwrap().is_none());
        assert!(history.is_empty());
    }
}
