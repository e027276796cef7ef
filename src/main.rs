use std::{error::Error, process};

use clap::Parser;
use jclass_class_file::{
    bytecode::{self, Instructions, Operand},
    jstring, ClassFile, ClassLoader, ConstantPool, DefaultClassLoader, IntType, MemberInfo,
    Visibility,
};
use jclass_manifest::Manifest;

#[derive(Parser, Debug)]
#[command(name = "jclass")]
#[command(about = "Inspect Java class files and JAR manifests")]
#[command(version)]
struct Args {
    /// Disassemble method bodies
    #[arg(short = 'c', long)]
    disassemble: bool,

    /// A .class file, a class name such as java.lang.String, or a .MF manifest
    #[arg(value_name = "TARGET")]
    target: String,

    /// Class path to search; defaults to $CLASSPATH
    #[arg(value_name = "CLASSPATH")]
    classpath: Option<String>,
}

fn main() {
    pretty_env_logger::init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("jclass: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    if args.target.ends_with(".MF") {
        print_manifest(&Manifest::open(&args.target)?);
        return Ok(());
    }

    let loader = DefaultClassLoader;
    let classpath = loader.classpath(args.classpath.as_deref(), None);
    log::debug!("Class path: {:?}", classpath);

    let class_file = ClassFile::load(&args.target, &classpath, &loader)?;
    print_class(&class_file, args.disassemble);
    Ok(())
}

fn print_manifest(manifest: &Manifest) {
    for section in manifest.sections() {
        match section.name() {
            Some(name) => println!("\nName: {}", name),
            None => println!("Main section"),
        }
        for entry in section.entries() {
            println!("    {}: {}", entry.key, entry.value.as_deref().unwrap_or(""));
        }
    }
}

fn print_class(class_file: &ClassFile, disassemble: bool) {
    let cp = &class_file.constant_pool;
    let unknown = || String::from("<unknown>");

    println!(
        "{} {}",
        class_file.access_flags.modifiers(true),
        class_file.class_name().unwrap_or_else(unknown)
    );
    println!(
        "Version: {}.{} ({})",
        class_file.major_version,
        class_file.minor_version,
        class_file.vm_spec_string()
    );
    if let Some(super_class) = class_file.super_class_name() {
        println!("Extends: {}", super_class);
    }
    let interfaces = class_file.interface_names();
    if !interfaces.is_empty() {
        println!("Implements: {}", interfaces.join(", "));
    }
    if let Some(source) = class_file.sourcefile_name() {
        println!("Source: {}", source);
    }
    println!("Constant pool: {} slots", cp.count());
    for (slot, tag) in cp.unrecognized() {
        println!("    unrecognized tag {} at {}", tag, slot);
    }

    println!("\nFields:");
    for field in visible(&class_file.fields, cp) {
        println!("    {}", member_signature(field, cp));
    }

    println!("\nMethods:");
    for method in visible(&class_file.methods, cp) {
        println!("    {}", member_signature(method, cp));
        if disassemble {
            print_code(method, cp);
        }
    }
}

fn visible<'a>(
    members: &'a [MemberInfo],
    cp: &'a ConstantPool,
) -> impl Iterator<Item = &'a MemberInfo> {
    members
        .iter()
        .filter(move |m| m.is_visible(Visibility::Private, cp))
}

fn member_signature(member: &MemberInfo, cp: &ConstantPool) -> String {
    let name = member.name(cp).unwrap_or_default();
    let descriptor = member.descriptor(cp).unwrap_or_default();
    let modifiers = member.access_flags.modifiers(false);
    let modifiers = if modifiers.is_empty() {
        modifiers
    } else {
        modifiers + " "
    };

    format!(
        "{}{} {}{}",
        modifiers,
        jstring::descriptor_type(&descriptor),
        name,
        jstring::descriptor_parameters_string(&descriptor)
    )
}

fn print_code(method: &MemberInfo, cp: &ConstantPool) {
    let Some(code) = method.code_attribute(cp) else {
        return;
    };

    for instruction in Instructions::new(&code.code) {
        let instruction = match instruction {
            Ok(instruction) => instruction,
            Err(e) => {
                log::warn!("Stopped disassembling: {}", e);
                break;
            }
        };

        let operands: Vec<_> = instruction
            .operands
            .iter()
            .map(|operand| render_operand(operand, cp))
            .collect();
        println!(
            "        {:>4}: {}{} {}",
            instruction.pc,
            if instruction.wide { "wide " } else { "" },
            instruction.name(),
            operands.join(" ")
        );
    }
}

fn render_operand(operand: &Operand, cp: &ConstantPool) -> String {
    use bytecode::OperandType::{
        ByteArrayType, ByteConstantIndex, ShortClassIndex, ShortConstantIndex, ShortFieldIndex,
        ShortMethodIndex,
    };

    match operand {
        Operand::Value(ShortMethodIndex | ShortFieldIndex, index) => cp
            .method_signature(*index as u16, true)
            .unwrap_or_else(|| format!("#{}", index)),
        Operand::Value(ShortClassIndex, index) => cp
            .class_name(*index as u16, false)
            .unwrap_or_else(|| format!("#{}", index)),
        Operand::Value(ByteConstantIndex | ShortConstantIndex, index) => cp
            .constant_value(*index as u16, IntType::Int)
            .unwrap_or_else(|| format!("#{}", index)),
        Operand::Value(ByteArrayType, code) => bytecode::array_type_name(*code as u8)
            .map(str::to_string)
            .unwrap_or_else(|| code.to_string()),
        Operand::Value(_, value) => value.to_string(),
        Operand::Target(target) => format!("-> {}", target),
        Operand::TableSwitch(switch) => format!(
            "{}..={} {:?} default -> {}",
            switch.low, switch.high, switch.targets, switch.default_target
        ),
        Operand::LookupSwitch(switch) => format!(
            "{:?} default -> {}",
            switch.pairs, switch.default_target
        ),
    }
}
