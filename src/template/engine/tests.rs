//! Tests for marker resolution and reassembly.

use super::*;
use crate::error::BatchError;
use crate::template::prompt::ConsolePrompter;
use crate::template::value::ValueType;
use crate::test_support::ScriptedPrompter;
use std::io::Cursor;

fn render_with(template: &str, answers: &[&'static str]) -> (Rendered, ScriptedPrompter) {
    let mut prompter = ScriptedPrompter::new(answers);
    let rendered = render(template, EvalContext::with_cwd("/home/x"), &mut prompter).unwrap();
    (rendered, prompter)
}

#[test]
fn template_without_markers_is_unchanged() {
    let template = "#!/bin/bash\r\n#SBATCH -N 1\n\n  echo ${HOME} {x}\n";
    let (rendered, prompter) = render_with(template, &[]);
    assert_eq!(rendered.text, template);
    assert!(rendered.answers.is_empty());
    assert!(prompter.asked.is_empty());
}

#[test]
fn hello_example() {
    let (rendered, prompter) = render_with("Hello {{name:str|Your name}}, cwd={{cwd}}", &["Ada"]);
    assert_eq!(rendered.text, "Hello Ada, cwd=/home/x");
    assert_eq!(rendered.answers, vec![Value::from("Ada"), Value::from("/home/x")]);
    assert_eq!(prompter.asked.len(), 1);
    assert_eq!(prompter.asked[0].0, "Your name");
}

#[test]
fn default_expression_sees_earlier_answer() {
    let template = "{{count:int|Count}} {{tasks:int|Tasks|eval:count*2}}";
    let (rendered, prompter) = render_with(template, &["5", ""]);
    assert_eq!(prompter.asked[1].1, Some(Value::Int(10)));
    assert_eq!(rendered.text, "5 10");
    assert_eq!(rendered.answers, vec![Value::Int(5), Value::Int(10)]);
}

#[test]
fn literal_default_is_offered_as_text() {
    let (rendered, prompter) = render_with("-N {{nodes:int|Nodes|4}}", &[""]);
    assert_eq!(prompter.asked[0].1, Some(Value::from("4")));
    assert_eq!(prompter.asked[0].2, ValueType::Int);
    assert_eq!(rendered.text, "-N 4");
}

#[test]
fn named_answers_are_bound_in_order() {
    let template = "{{nodes:int|Nodes}} {{cores:int|Cores}} {{nodes*cores}}";
    let (rendered, _) = render_with(template, &["2", "8"]);
    assert_eq!(rendered.text, "2 8 16");
    assert_eq!(rendered.context.get("nodes"), Some(&Value::Int(2)));
    assert_eq!(rendered.context.get("cores"), Some(&Value::Int(8)));
}

#[test]
fn computed_results_are_never_bound() {
    let template = "{{1 + 1}} {{x:int|X}}";
    let (rendered, _) = render_with(template, &["3"]);
    assert_eq!(rendered.text, "2 3");
    assert_eq!(
        rendered.context.names().collect::<Vec<_>>(),
        vec!["cwd", "x"]
    );
}

#[test]
fn later_names_are_invisible_to_earlier_markers() {
    let template = "{{later}} {{later:int|Later}}";
    let mut prompter = ScriptedPrompter::new(&["1"]);
    let err = render(template, EvalContext::with_cwd("/"), &mut prompter).unwrap_err();
    match err {
        BatchError::Template(TemplateError::Expression { expression, reason }) => {
            assert_eq!(expression, "later");
            assert_eq!(reason, expr::ExprError::UnknownName("later".to_string()));
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(prompter.asked.is_empty());
}

#[test]
fn oversized_computed_marker_is_template_error() {
    let template = "#SBATCH -J {{'x' * 9223372036854775807}}\n";
    let err = render(template, EvalContext::new(), &mut ScriptedPrompter::new(&[])).unwrap_err();
    assert_eq!(err.exit_code(), crate::exit_codes::TEMPLATE_ERROR);
    assert!(err.to_string().contains("'x' * 9223372036854775807"));
}

#[test]
fn default_cannot_see_its_own_name() {
    let template = "{{n:int|N|eval:n+1}}";
    let mut prompter = ScriptedPrompter::new(&[""]);
    let err = render(template, EvalContext::new(), &mut prompter).unwrap_err();
    assert!(matches!(
        err,
        BatchError::Template(TemplateError::Expression { .. })
    ));
}

#[test]
fn rebinding_a_name_only_affects_later_markers() {
    let template = "{{n:int|First}} {{n*10}} {{n:int|Second}} {{n*10}}";
    let (rendered, _) = render_with(template, &["1", "2"]);
    assert_eq!(rendered.text, "1 10 2 20");
}

#[test]
fn answer_count_matches_marker_count() {
    let template = "{{a:str|A}}{{a}}\n{{b:int|B|3}} {{cwd}}";
    let (rendered, _) = render_with(template, &["x", ""]);
    assert_eq!(rendered.answers.len(), scan(template).count());
    assert_eq!(rendered.text, "xx\n3 /home/x");
}

#[test]
fn substituted_text_is_not_rescanned() {
    let (rendered, _) = render_with("[{{v:str|Value}}]", &["{{cwd}}"]);
    assert_eq!(rendered.text, "[{{cwd}}]");
}

#[test]
fn reassemble_round_trip() {
    let template = "a {{x}} b {{y}}\r\nc";
    let spans: Vec<_> = scan(template).collect();
    let answers = vec![Value::Int(1), Value::Float(2.5)];
    let text = reassemble(template, &spans, &answers).unwrap();
    assert_eq!(text, "a 1 b 2.5\r\nc");

    // Replacing each span by hand gives the same result.
    let mut manual = template.to_string();
    for (span, answer) in spans.iter().zip(&answers).rev() {
        manual.replace_range(span.start..span.end, &answer.to_string());
    }
    assert_eq!(text, manual);
}

#[test]
fn reassemble_rejects_wrong_answer_count() {
    let template = "{{a}} {{b}}";
    let spans: Vec<_> = scan(template).collect();
    let err = reassemble(template, &spans, &[Value::Int(1)]).unwrap_err();
    assert_eq!(
        err,
        TemplateError::AnswerCount {
            markers: 2,
            answers: 1
        }
    );
}

#[test]
fn malformed_marker_aborts_before_prompting() {
    let mut prompter = ScriptedPrompter::new(&[]);
    let err = render("{{a|b|c|d}}", EvalContext::new(), &mut prompter).unwrap_err();
    assert!(matches!(
        err,
        BatchError::Template(TemplateError::FieldCount { count: 4, .. })
    ));
}

#[test]
fn unknown_type_is_a_template_error() {
    let mut prompter = ScriptedPrompter::new(&[]);
    let err = render("{{flag:bool|Flag}}", EvalContext::new(), &mut prompter).unwrap_err();
    assert_eq!(err.exit_code(), crate::exit_codes::TEMPLATE_ERROR);
}

#[test]
fn console_prompter_retries_invalid_input() {
    let input = Cursor::new(b"abc\n3\n".to_vec());
    let mut prompter = ConsolePrompter::new(input, Vec::new());
    let rendered = render(
        "#SBATCH -N {{nodes:int|Number of nodes}}\n",
        EvalContext::new(),
        &mut prompter,
    )
    .unwrap();
    assert_eq!(rendered.text, "#SBATCH -N 3\n");
    let transcript = String::from_utf8(prompter.into_output()).unwrap();
    assert_eq!(
        transcript,
        "Number of nodes: Invalid answer! Number of nodes: "
    );
}

#[test]
fn full_job_script() {
    let template = "\
#!/bin/bash
#SBATCH --job-name={{name:str|Job name|job}}
#SBATCH --nodes={{nodes:int|Nodes|1}}
#SBATCH --ntasks={{ntasks:int|Tasks|eval:nodes*32}}
#SBATCH --time={{hours:int|Hours|2}}:00:00
cd {{cwd}}
srun ./run {{basename(cwd)}}-{{name}}.log
";
    let (rendered, prompter) = render_with(template, &["sim", "2", "", ""]);
    assert_eq!(prompter.asked[2].1, Some(Value::Int(64)));
    assert_eq!(
        rendered.text,
        "\
#!/bin/bash
#SBATCH --job-name=sim
#SBATCH --nodes=2
#SBATCH --ntasks=64
#SBATCH --time=2:00:00
cd /home/x
srun ./run x-sim.log
"
    );
}
