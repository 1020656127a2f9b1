/* SPDX-FileCopyrightText: © 2025 Decompollaborate */
/* SPDX-License-Identifier: MIT */

use clap::Parser;
use parsed_elf::ParsedElf;
use mipsdis::{
    self,
    address_range::AddressRange,
    analysis::StringGuesserLevel,
    config::GlobalConfig,
    context::{Context, ContextBuilder},
    parent_segment_info::ParentSegmentInfo,
    rabbitizer::{InstructionFlags, Vram},
    rom_address::RomAddress,
    rom_vram_range::RomVramRange,
    sections::{Section, SectionDataSettings, SectionNoloadSettings, SectionTextSettings},
};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::PathBuf,
};

mod elf_section_type;
mod elf_symbol;
mod parsed_elf;
mod utils;

use elf_section_type::ProgbitsType;

#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, clap::ValueEnum)]
#[allow(non_camel_case_types)]
pub enum ArgCompiler {
    #[clap(aliases=&["ido"])]
    IDO,
}

impl From<ArgCompiler> for mipsdis::config::Compiler {
    fn from(value: ArgCompiler) -> Self {
        match value {
            ArgCompiler::IDO => Self::IDO,
        }
    }
}

/// mipsdis-elf: inspect an ELF32 MIPS relocatable object with mipsdis
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    input_path: PathBuf,

    #[clap(long)]
    compiler: Option<ArgCompiler>,
}

fn elf_section_vram(address: Vram, offset: RomAddress) -> Vram {
    // Relocatable objects don't carry a real vram, so we reuse the rom offset
    // as a stand-in address space to keep every section non-overlapping.
    if address != Vram::new(0) {
        address
    } else {
        Vram::new(offset.inner())
    }
}

fn parse_elf(input_path: &PathBuf) -> ParsedElf {
    let binary_data = {
        let mut buf = Vec::new();
        let f = File::open(input_path).expect("Input file not found");
        BufReader::new(f)
            .read_to_end(&mut buf)
            .expect("Error reading the file");
        buf
    };
    let elf_file = utils::read_elf(&binary_data);
    ParsedElf::parse_elf(elf_file)
}

fn global_ranges(elf: &ParsedElf) -> RomVramRange {
    let mut rom_start = None;
    let mut rom_end = None;
    let mut vram_start = None;
    let mut vram_end = None;

    let mut expand = |rom: RomAddress, rom_size: u32, vram: Vram, vram_size: u32| {
        let r_end = RomAddress::new(rom.inner() + rom_size);
        let v_end = Vram::new(vram.inner() + vram_size);

        rom_start = Some(rom_start.map_or(rom, |x: RomAddress| x.min(rom)));
        rom_end = Some(rom_end.map_or(r_end, |x: RomAddress| x.max(r_end)));
        vram_start = Some(vram_start.map_or(vram, |x: Vram| x.min(vram)));
        vram_end = Some(vram_end.map_or(v_end, |x: Vram| x.max(v_end)));
    };

    for section in elf.executable_sections() {
        let vram = elf_section_vram(section.address(), section.offset());
        expand(section.offset(), section.size().inner(), vram, section.size().inner());
    }
    for section in elf.data_sections() {
        let vram = elf_section_vram(section.address(), section.offset());
        expand(section.offset(), section.size().inner(), vram, section.size().inner());
    }
    for section in elf.nobits_sections() {
        let vram = elf_section_vram(section.address(), section.offset());
        expand(section.offset(), section.size().inner(), vram, section.size().inner());
    }

    RomVramRange::new(
        AddressRange::new(
            rom_start.expect("elf has no allocated sections"),
            rom_end.unwrap(),
        ),
        AddressRange::new(vram_start.unwrap(), vram_end.unwrap()),
    )
}

fn build_context(elf: &ParsedElf, ranges: RomVramRange) -> Context {
    let global_config = GlobalConfig::new(elf.endian());
    let mut builder = ContextBuilder::new(global_config, ranges);

    {
        let mut global_segment = builder.global_segment();
        for (&value, syms_per_value) in elf.symbols() {
            let vram = Vram::new(value);
            if !ranges.vram().in_range(vram) {
                continue;
            }
            for sym in syms_per_value.syms() {
                if matches!(sym.typ(), elf_symbol::ElfSymType::Function) {
                    global_segment.add_function(sym.name().to_string(), vram, None);
                } else {
                    global_segment.add_symbol(sym.name().to_string(), vram, None);
                }
            }
        }
    }

    builder.process().process().process().build()
}

fn disassemble_sections(elf: &ParsedElf, context: &mut Context, compiler: Option<mipsdis::config::Compiler>) {
    let global_rom_start = context.global_segment().rom_vram_range().rom().start();
    let parent_segment_info = ParentSegmentInfo::new(global_rom_start, None);

    let text_settings = SectionTextSettings::new(InstructionFlags::new());
    for section in elf.executable_sections() {
        let vram = elf_section_vram(section.address(), section.offset());
        match context.create_section_text(
            &text_settings,
            section.name().to_string(),
            section.data(),
            section.offset(),
            vram,
            parent_segment_info.clone(),
        ) {
            Ok(sec) => println!(
                "{}: {} functions",
                sec.name(),
                sec.functions().len()
            ),
            Err(e) => eprintln!("{}: {}", section.name(), e),
        }
    }

    let string_guesser_flags = StringGuesserLevel::Full;
    let data_settings = SectionDataSettings::new(compiler)
        .with_string_guesser_flags(string_guesser_flags);
    for section in elf.data_sections() {
        let vram = elf_section_vram(section.address(), section.offset());
        let result = match section.progbits_type() {
            ProgbitsType::Text => continue,
            ProgbitsType::Data => context.create_section_data(
                &data_settings,
                section.name().to_string(),
                section.data(),
                section.offset(),
                vram,
                parent_segment_info.clone(),
            ),
            ProgbitsType::Rodata => context.create_section_rodata(
                &data_settings,
                section.name().to_string(),
                section.data(),
                section.offset(),
                vram,
                parent_segment_info.clone(),
            ),
        };
        match result {
            Ok(sec) => println!("{}: {} bytes", sec.name(), section.data().len()),
            Err(e) => eprintln!("{}: {}", section.name(), e),
        }
    }

    let nobits_settings = SectionNoloadSettings::new();
    for section in elf.nobits_sections() {
        let vram = elf_section_vram(section.address(), section.offset());
        match context.create_section_bss(
            &nobits_settings,
            section.name().to_string(),
            vram,
            section.size(),
            parent_segment_info.clone(),
        ) {
            Ok(sec) => println!("{}: bss, {} bytes", sec.name(), section.size().inner()),
            Err(e) => eprintln!("{}: {}", section.name(), e),
        }
    }
}

fn main() {
    let args = Args::parse();

    println!("input path: {:?}", args.input_path);

    let elf = parse_elf(&args.input_path);
    let ranges = global_ranges(&elf);

    println!(
        "rom range: {:?}..{:?}, vram range: {:?}..{:?}",
        ranges.rom().start(),
        ranges.rom().end(),
        ranges.vram().start(),
        ranges.vram().end()
    );

    let mut context = build_context(&elf, ranges);

    let compiler = args.compiler.map(Into::into);
    disassemble_sections(&elf, &mut context, compiler);

    println!("symbols discovered: {}", context.global_segment().symbols().len());
}
