/// Sample conversations shown when the viewer runs without the extension

use crate::conversation::Conversation;

fn sample(id: &str, title: &str, responses: &[&str]) -> Conversation {
    Conversation::new(id, title, responses.iter().map(|s| s.to_string()).collect())
}

pub fn sample_conversations() -> Vec<Conversation> {
    vec![
        sample(
            "53a347cb-5a74-42fb-8f23-6cb6c7d84c0f",
            "Simple C# Console Greeting Script",
            &[
                "show me a 10 line c# script",
                "Below is a short C# console program that asks for a name and greets the user.\n\n```csharp\nusing System;\n\nclass Program\n{\n    static void Main()\n    {\n        Console.Write(\"Enter your name: \");\n        string name = Console.ReadLine();\n        Console.WriteLine($\"Hello, {name}!\");\n    }\n}\n```",
            ],
        ),
        sample(
            "3e09bd00-336a-4d4f-a64d-903f16a7088f",
            "Python Script: Squares Calculation Example",
            &[
                "create a 10 line python script",
                "```python\nsquares = [n * n for n in range(1, 11)]\nfor n, sq in enumerate(squares, start=1):\n    print(f\"{n} squared is {sq}\")\n```\n\nThe script builds a list of squares and prints each one.",
                "Make the script more interactive",
                "```python\nlimit = int(input(\"How many squares? \"))\nfor n in range(1, limit + 1):\n    print(f\"{n} squared is {n * n}\")\n```",
            ],
        ),
        sample(
            "a29b3eb4-9eef-4bc4-8a6e-ac1b37112252",
            "Bash scripting",
            &[
                "show me a simple bash script",
                "Below is a simple Bash script that prints **Hello, World!** to the console.\n\n```bash\n#!/bin/bash\necho \"Hello, World!\"\n```\n\nMake it executable with `chmod +x hello.sh`.",
            ],
        ),
        sample(
            "aefe1141-a4fb-496d-b353-5d228a24e520",
            "ReactJS: Components, Hooks, and Examples",
            &[
                "reactjs framework with examples",
                "### Overview of ReactJS\n\nReact is a JavaScript library for building user interfaces out of **components**.\n\n```jsx\nfunction Counter() {\n  const [count, setCount] = useState(0);\n  return <button onClick={() => setCount(count + 1)}>{count}</button>;\n}\n```",
            ],
        ),
        sample(
            "a6e4b58e-3852-4005-9887-c7e0a621859a",
            "Basic C++ Hello World Program",
            &[
                "show me a c++ program",
                "```cpp\n#include <iostream>\n\nint main() {\n    std::cout << \"Hello, World!\" << std::endl;\n    return 0;\n}\n```\n\nThis program writes a greeting to standard output.",
                "Compare C++ with Python input handling",
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::conversation_id;

    #[test]
    fn test_sample_ids_are_conversation_ids() {
        for conversation in sample_conversations() {
            let path = format!("/c/{}", conversation.id);
            assert_eq!(conversation_id(&path), Some(conversation.id.clone()));
        }
    }

    #[test]
    fn test_sample_ids_are_unique() {
        let samples = sample_conversations();
        let mut ids: Vec<&str> = samples.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), samples.len());
    }
}
