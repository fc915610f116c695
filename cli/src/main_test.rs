#[cfg(test)]
mod tests {
    use crate::report::InlineReport;
    use crate::*;

    #[test]
    fn test_sanitize_path_allows_simple_relative() {
        let p = sanitize_path("logs/ssa.txt").expect("relative path should be allowed");
        assert_eq!(p, PathBuf::from("logs/ssa.txt"));
    }

    #[test]
    fn test_sanitize_path_rejects_parent_dir() {
        let err = sanitize_path("logs/../ssa.txt").unwrap_err();
        assert!(err.to_string().contains("Parent directory components"));
    }

    #[test]
    fn test_workspace_file_name_normalizes_prefixes() {
        assert_eq!(workspace_file_name("main.go"), "/main.go");
        assert_eq!(workspace_file_name("./pkg/a.go"), "/pkg/a.go");
        assert_eq!(workspace_file_name("/main.go"), "/main.go");
    }

    #[test]
    fn test_env_toggle_and_filter() {
        assert!(!env_toggle_enabled(""));
        assert!(!env_toggle_enabled("off"));
        assert!(env_toggle_enabled("1"));
        assert_eq!(filter_expr_from("true"), None);
        assert_eq!(filter_expr_from("gossa_core=trace"), Some("gossa_core=trace".to_string()));
    }

    #[test]
    fn test_cli_args_ssa_with_method_identifier() {
        let args = CliArgs::try_parse_from(["gossa", "ssa", "(*T).Method", "--line", "12"]).expect("should parse");
        match args.command {
            Commands::Ssa { function, line, .. } => {
                assert_eq!(function, "(*T).Method");
                assert_eq!(line, Some(12));
            }
            _ => panic!("expected ssa command"),
        }
    }

    #[test]
    fn test_cli_args_rejects_parent_dir_in_input() {
        let err = CliArgs::try_parse_from(["gossa", "ssa", "pkg.Foo", "--input", "../dump.txt"]).unwrap_err();
        assert!(err.to_string().contains("Parent directory components"));
    }

    #[test]
    fn test_cli_args_no_decisions_conflicts_with_decisions_file() {
        let res = CliArgs::try_parse_from(["gossa", "ssa", "Foo", "--no-decisions", "--decisions", "m2.txt"]);
        assert!(res.is_err());
    }

    #[test]
    fn test_empty_function_name_is_a_silent_no_op() {
        run_ssa("   ", None, None, None, None, false, false).expect("empty name should be ignored");
    }

    #[test]
    fn test_inline_report_text() {
        let decisions =
            gossa_core::parse_inline_decisions("./main.go:9:13: inlining call to add\n./main.go:4:6: can inline add with cost 4 as: func() {}\n");
        let text = InlineReport::new("/main.go".into(), decisions).to_text();
        assert_eq!(text, "4: can inline add with cost 4\n9: inlining call to add\n");

        let empty = InlineReport::new("/x.go".into(), gossa_core::InlineDecisionMap::new()).to_text();
        assert_eq!(empty, "No inlining decisions for /x.go\n");
    }
}
